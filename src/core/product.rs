//! Product model - the spare-part record and its wire format.
//!
//! Products are stored remotely as loosely-typed documents whose field names are
//! fixed by the existing collection (`nombreRepuesto`, `precio`, `cantidadStock`, ...).
//! This module owns the mapping between those documents and the typed [`Product`],
//! the registration payload [`NewProduct`], and the explicit partial update
//! [`ProductPatch`]. Decoding is deliberately forgiving because older clients wrote
//! numbers as strings and sometimes left fields out entirely.

use crate::{
    errors::{Error, InvalidField, Result},
    store::{Document, Fields, to_fields},
};
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt, str::FromStr};

/// Fixed set of part categories offered by the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    /// Motor
    Engine,
    /// Frenos
    Brakes,
    /// Suspensión
    Suspension,
    /// Transmisión
    Transmission,
    /// Sistema eléctrico
    Electrical,
    /// Carrocería
    Bodywork,
    /// Escape
    Exhaust,
    /// Llantas y neumáticos
    Tires,
    /// Filtros
    Filters,
    /// Lubricantes
    Lubricants,
    /// Accesorios
    Accessories,
}

impl Category {
    /// Every category, in the order the picker shows them.
    pub const ALL: [Self; 11] = [
        Self::Engine,
        Self::Brakes,
        Self::Suspension,
        Self::Transmission,
        Self::Electrical,
        Self::Bodywork,
        Self::Exhaust,
        Self::Tires,
        Self::Filters,
        Self::Lubricants,
        Self::Accessories,
    ];

    /// The label stored in the `categoria` field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Engine => "Motor",
            Self::Brakes => "Frenos",
            Self::Suspension => "Suspensión",
            Self::Transmission => "Transmisión",
            Self::Electrical => "Sistema eléctrico",
            Self::Bodywork => "Carrocería",
            Self::Exhaust => "Escape",
            Self::Tires => "Llantas y neumáticos",
            Self::Filters => "Filtros",
            Self::Lubricants => "Lubricantes",
            Self::Accessories => "Accesorios",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.label().to_lowercase() == wanted)
            .ok_or_else(|| Error::Validation {
                fields: vec![InvalidField {
                    field: wire::CATEGORY,
                    problem: "is not a known category",
                }],
            })
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.label().to_string()
    }
}

/// Wire names of the document fields.
pub mod wire {
    /// Part name
    pub const NAME: &str = "nombreRepuesto";
    /// Free text description
    pub const DESCRIPTION: &str = "descripcion";
    /// Manufacturer
    pub const BRAND: &str = "marca";
    /// Motorcycle model the part fits
    pub const MODEL: &str = "modelo";
    /// Unit price
    pub const PRICE: &str = "precio";
    /// Picture URI
    pub const IMAGE: &str = "imageUri";
    /// Units in stock
    pub const STOCK: &str = "cantidadStock";
    /// Optional category label
    pub const CATEGORY: &str = "categoria";
}

/// A spare part as mirrored from the remote collection.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "ProductBody")]
pub struct Product {
    /// Opaque id assigned by the store; not part of the document body
    pub id: String,
    /// Part name (`nombreRepuesto`)
    pub name: String,
    /// Free-text description (`descripcion`)
    pub description: String,
    /// Manufacturer (`marca`)
    pub brand: String,
    /// Motorcycle model the part fits (`modelo`)
    pub model: String,
    /// Unit price (`precio`); 0 when the document has none
    pub price: f64,
    /// Image location (`imageUri`, or the legacy `imageUrl`)
    pub image_ref: String,
    /// Units in stock (`cantidadStock`)
    pub stock: u32,
    /// Category (`categoria`), if it is one of the known labels
    pub category: Option<Category>,
}

/// Document body as stored. `imageUri` and the legacy `imageUrl` are separate
/// keys here because an edited legacy document can carry both.
#[derive(Deserialize)]
struct ProductBody {
    #[serde(rename = "nombreRepuesto", default, deserialize_with = "lenient::text")]
    name: String,
    #[serde(rename = "descripcion", default, deserialize_with = "lenient::text")]
    description: String,
    #[serde(rename = "marca", default, deserialize_with = "lenient::text")]
    brand: String,
    #[serde(rename = "modelo", default, deserialize_with = "lenient::text")]
    model: String,
    #[serde(rename = "precio", default, deserialize_with = "lenient::price")]
    price: f64,
    #[serde(rename = "imageUri", default, deserialize_with = "lenient::text")]
    image_uri: String,
    #[serde(rename = "imageUrl", default, deserialize_with = "lenient::text")]
    legacy_image_url: String,
    #[serde(rename = "cantidadStock", default, deserialize_with = "lenient::stock")]
    stock: u32,
    #[serde(rename = "categoria", default, deserialize_with = "lenient::category")]
    category: Option<Category>,
}

impl From<ProductBody> for Product {
    fn from(body: ProductBody) -> Self {
        // imageUri wins; imageUrl only fills in when it is missing or blank
        let image_ref = if body.image_uri.trim().is_empty() {
            body.legacy_image_url
        } else {
            body.image_uri
        };
        Self {
            id: String::new(),
            name: body.name,
            description: body.description,
            brand: body.brand,
            model: body.model,
            price: body.price,
            image_ref,
            stock: body.stock,
            category: body.category,
        }
    }
}

impl Product {
    /// Decodes a remote document into a product, keeping the document id.
    ///
    /// # Errors
    /// Returns [`Error::Decode`] when a field has a value that cannot be
    /// interpreted (negative stock, non-numeric price...).
    pub fn from_document(document: Document) -> Result<Self> {
        let Document { id, fields } = document;
        let mut product: Self = serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| Error::Decode {
                id: id.clone(),
                message: e.to_string(),
            })?;
        product.id = id;
        Ok(product)
    }

    /// Text of one searchable field, as shown on screen.
    #[must_use]
    pub fn field_text(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::Name => Cow::Borrowed(&self.name),
            Field::Description => Cow::Borrowed(&self.description),
            Field::Brand => Cow::Borrowed(&self.brand),
            Field::Model => Cow::Borrowed(&self.model),
            // absent prices decode as 0
            Field::Price if self.price == 0.0 => Cow::Borrowed(""),
            Field::Price => Cow::Owned(self.price.to_string()),
            Field::Stock => Cow::Owned(self.stock.to_string()),
            Field::Category => Cow::Borrowed(self.category.map_or("", Category::label)),
        }
    }

    /// Whether at least one unit can be sold.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Fields the filter engine can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `nombreRepuesto`
    Name,
    /// `descripcion`
    Description,
    /// `marca`
    Brand,
    /// `modelo`
    Model,
    /// `precio`, rendered without trailing zeros
    Price,
    /// `cantidadStock`
    Stock,
    /// `categoria` label
    Category,
}

/// Payload of the registration form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    /// Part name, required
    #[serde(rename = "nombreRepuesto")]
    pub name: String,
    /// Description, required
    #[serde(rename = "descripcion")]
    pub description: String,
    /// Brand, required
    #[serde(rename = "marca")]
    pub brand: String,
    /// Model, required
    #[serde(rename = "modelo")]
    pub model: String,
    /// Unit price, must be greater than 0
    #[serde(rename = "precio")]
    pub price: f64,
    /// Image location, required
    #[serde(rename = "imageUri")]
    pub image_ref: String,
    /// Initial stock, must be at least 1
    #[serde(rename = "cantidadStock")]
    pub stock: u32,
    /// Optional category
    #[serde(rename = "categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl NewProduct {
    /// Checks every required field and reports all problems at once.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] listing each missing or invalid field:
    /// - any text field empty or whitespace-only
    /// - price not finite or not greater than zero
    /// - initial stock of zero
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();

        for (field, value) in [
            (wire::NAME, &self.name),
            (wire::DESCRIPTION, &self.description),
            (wire::BRAND, &self.brand),
            (wire::MODEL, &self.model),
            (wire::IMAGE, &self.image_ref),
        ] {
            if value.trim().is_empty() {
                fields.push(InvalidField {
                    field,
                    problem: "is required",
                });
            }
        }

        if let Some(problem) = price_problem(self.price) {
            fields.push(InvalidField {
                field: wire::PRICE,
                problem,
            });
        }

        if self.stock == 0 {
            fields.push(InvalidField {
                field: wire::STOCK,
                problem: "must be greater than 0",
            });
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { fields })
        }
    }

    /// Serializes the payload into a document body.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_fields(&self) -> Result<Fields> {
        to_fields(self)
    }

    /// Builds the full record once the store has assigned an id.
    #[must_use]
    pub fn into_product(self, id: String) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            brand: self.brand,
            model: self.model,
            price: self.price,
            image_ref: self.image_ref,
            stock: self.stock,
            category: self.category,
        }
    }
}

/// Partial update: only the fields that are `Some` are written.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProductPatch {
    /// New name
    #[serde(rename = "nombreRepuesto", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New brand
    #[serde(rename = "marca", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// New model
    #[serde(rename = "modelo", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// New unit price
    #[serde(rename = "precio", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New image location, always written as `imageUri`
    #[serde(rename = "imageUri", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// New stock count; 0 is allowed here
    #[serde(rename = "cantidadStock", skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    /// New category
    #[serde(rename = "categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl ProductPatch {
    /// A patch that only sets the stock count.
    #[must_use]
    pub fn stock(stock: u32) -> Self {
        Self {
            stock: Some(stock),
            ..Self::default()
        }
    }

    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.brand.is_none()
            && self.model.is_none()
            && self.price.is_none()
            && self.image_ref.is_none()
            && self.stock.is_none()
            && self.category.is_none()
    }

    /// Checks the fields that are present. Stock may be set to zero here.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if a present text field is blank or a
    /// present price is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();

        for (field, value) in [
            (wire::NAME, &self.name),
            (wire::DESCRIPTION, &self.description),
            (wire::BRAND, &self.brand),
            (wire::MODEL, &self.model),
            (wire::IMAGE, &self.image_ref),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                fields.push(InvalidField {
                    field,
                    problem: "cannot be blank",
                });
            }
        }

        if let Some(problem) = self.price.and_then(price_problem) {
            fields.push(InvalidField {
                field: wire::PRICE,
                problem,
            });
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { fields })
        }
    }

    /// Serializes only the present fields.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_fields(&self) -> Result<Fields> {
        to_fields(self)
    }

    /// Merges the present fields into a mirrored record.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(brand) = &self.brand {
            product.brand.clone_from(brand);
        }
        if let Some(model) = &self.model {
            product.model.clone_from(model);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(image_ref) = &self.image_ref {
            product.image_ref.clone_from(image_ref);
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = Some(category);
        }
    }
}

fn price_problem(price: f64) -> Option<&'static str> {
    if !price.is_finite() {
        Some("must be a valid number")
    } else if price <= 0.0 {
        Some("must be greater than 0")
    } else {
        None
    }
}

/// Deserializers that accept the shapes older clients wrote.
mod lenient {
    use serde::{Deserialize, Deserializer, de::Error as _};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrText::Number(n)) => Ok(Some(n)),
            Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(NumberOrText::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, got {text:?}"))),
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Labels outside the known list (or blank) read as uncategorized.
    pub fn category<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<super::Category>, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.and_then(|label| label.parse().ok()))
    }

    pub fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(number(deserializer)?.unwrap_or(0.0))
    }

    pub fn stock<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let Some(value) = number(deserializer)? else {
            return Ok(0);
        };
        if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return Err(D::Error::custom(format!(
                "stock must be a non-negative integer, got {value}"
            )));
        }
        // Range and integrality checked above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(value as u32)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::sample_new_product;
    use serde_json::json;

    fn document(id: &str, body: serde_json::Value) -> Document {
        let serde_json::Value::Object(fields) = body else {
            panic!("test document must be an object");
        };
        Document {
            id: id.to_string(),
            fields,
        }
    }

    #[test]
    fn test_decode_full_document() {
        let product = Product::from_document(document(
            "abc",
            json!({
                "nombreRepuesto": "Filtro",
                "descripcion": "aire",
                "marca": "K&N",
                "modelo": "CB190",
                "precio": 10,
                "imageUri": "file:///img.jpg",
                "cantidadStock": 4,
                "categoria": "Filtros"
            }),
        ))
        .unwrap();

        assert_eq!(product.id, "abc");
        assert_eq!(product.name, "Filtro");
        assert_eq!(product.price, 10.0);
        assert_eq!(product.stock, 4);
        assert_eq!(product.category, Some(Category::Filters));
    }

    #[test]
    fn test_decode_legacy_shapes() {
        // Older edit screen stored numbers as strings and used `imageUrl`.
        let product = Product::from_document(document(
            "legacy",
            json!({
                "nombreRepuesto": "Bujía",
                "precio": "25.5",
                "cantidadStock": "3",
                "imageUrl": "https://cdn/bujia.png",
                "descripcion": null
            }),
        ))
        .unwrap();

        assert_eq!(product.price, 25.5);
        assert_eq!(product.stock, 3);
        assert_eq!(product.image_ref, "https://cdn/bujia.png");
        assert_eq!(product.description, "");
        assert_eq!(product.brand, "");
        assert_eq!(product.category, None);
    }

    #[test]
    fn test_decode_document_with_both_image_keys() {
        // A legacy document whose image was edited keeps its old `imageUrl`.
        let product = Product::from_document(document(
            "edited",
            json!({
                "nombreRepuesto": "Bujía",
                "imageUrl": "https://cdn/old.png",
                "imageUri": "file:///new.jpg"
            }),
        ))
        .unwrap();
        assert_eq!(product.image_ref, "file:///new.jpg");

        let blank_uri = Product::from_document(document(
            "blank",
            json!({ "imageUrl": "https://cdn/old.png", "imageUri": "" }),
        ))
        .unwrap();
        assert_eq!(blank_uri.image_ref, "https://cdn/old.png");
    }

    #[test]
    fn test_decode_rejects_negative_stock() {
        let result = Product::from_document(document(
            "bad",
            json!({ "nombreRepuesto": "Cadena", "cantidadStock": -1 }),
        ));

        assert!(matches!(result, Err(Error::Decode { id, .. }) if id == "bad"));
    }

    #[test]
    fn test_decode_unknown_category_as_uncategorized() {
        let product = Product::from_document(document(
            "7",
            json!({ "nombreRepuesto": "Casco", "categoria": "Ropa" }),
        ))
        .unwrap();

        assert_eq!(product.name, "Casco");
        assert_eq!(product.category, None);
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(
            "sistema ELÉCTRICO".parse::<Category>().unwrap(),
            Category::Electrical
        );
        assert!("Ropa".parse::<Category>().is_err());
        assert_eq!(Category::ALL.len(), 11);
    }

    #[test]
    fn test_new_product_validation_lists_all_problems() {
        let mut product = sample_new_product("Filtro");
        product.brand = "  ".to_string();
        product.price = 0.0;
        product.stock = 0;

        let Err(Error::Validation { fields }) = product.validate() else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field).collect();
        assert_eq!(names, vec![wire::BRAND, wire::PRICE, wire::STOCK]);
    }

    #[test]
    fn test_new_product_rejects_non_finite_price() {
        let mut product = sample_new_product("Filtro");
        product.price = f64::NAN;

        assert!(matches!(
            product.validate(),
            Err(Error::Validation { fields }) if fields[0].field == wire::PRICE
        ));
        assert!(sample_new_product("Filtro").validate().is_ok());
    }

    #[test]
    fn test_new_product_fields_use_wire_names() {
        let fields = sample_new_product("Filtro").to_fields().unwrap();

        assert_eq!(fields[wire::NAME], json!("Filtro"));
        assert_eq!(fields[wire::STOCK], json!(5));
        assert!(fields.contains_key(wire::IMAGE));
        assert!(!fields.contains_key("imageUrl"));
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = ProductPatch {
            brand: Some("X".to_string()),
            ..ProductPatch::default()
        };

        let fields = patch.to_fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[wire::BRAND], json!("X"));
    }

    #[test]
    fn test_patch_apply_leaves_unset_fields() {
        let mut product = sample_new_product("Filtro").into_product("1".to_string());
        let before = product.clone();

        ProductPatch {
            brand: Some("X".to_string()),
            ..ProductPatch::default()
        }
        .apply_to(&mut product);

        assert_eq!(product.brand, "X");
        assert_eq!(product.description, before.description);
        assert_eq!(product.stock, before.stock);
    }

    #[test]
    fn test_patch_validation() {
        assert!(ProductPatch::stock(0).validate().is_ok());
        assert!(ProductPatch::default().is_empty());
        assert!(!ProductPatch::stock(0).is_empty());

        let patch = ProductPatch {
            name: Some(String::new()),
            price: Some(-1.0),
            ..ProductPatch::default()
        };
        let Err(Error::Validation { fields }) = patch.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_field_text_price_rendering() {
        let mut product = sample_new_product("Filtro").into_product("1".to_string());
        product.price = 10.0;
        assert_eq!(product.field_text(Field::Price), "10");
        product.price = 10.5;
        assert_eq!(product.field_text(Field::Price), "10.5");
        product.price = 0.0;
        assert_eq!(product.field_text(Field::Price), "");
    }
}
