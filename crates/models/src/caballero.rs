//! Knight ("caballero") document and the partial-update types built on it.
//!
//! - `CaballeroUpdate` is the request body: every field optional, unknown keys
//!   dropped by serde.
//! - `ChangeSet` is what reaches the store: only the fields that carried a
//!   value, in `CaballeroField::ALL` order.

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::ModelError;

/// Stored knight document. Schema is owned elsewhere, so every attribute is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Caballero {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constelacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edad: Option<i64>,
    #[serde(rename = "urlImagen", default, skip_serializing_if = "Option::is_none")]
    pub url_imagen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altura: Option<f64>,
}

impl Caballero {
    /// Apply a change-set in memory, the same way `$set` does on the server.
    pub fn apply(&mut self, changes: &ChangeSet) {
        for change in changes.iter() {
            match change {
                Change::Nombre(v) => self.nombre = Some(v.clone()),
                Change::Constelacion(v) => self.constelacion = Some(v.clone()),
                Change::Edad(v) => self.edad = Some(*v),
                Change::UrlImagen(v) => self.url_imagen = Some(v.clone()),
                Change::Altura(v) => self.altura = Some(*v),
            }
        }
    }
}

/// Updatable attributes, in the order they are written and echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaballeroField {
    Nombre,
    Constelacion,
    Edad,
    UrlImagen,
    Altura,
}

impl CaballeroField {
    pub const ALL: [CaballeroField; 5] = [
        CaballeroField::Nombre,
        CaballeroField::Constelacion,
        CaballeroField::Edad,
        CaballeroField::UrlImagen,
        CaballeroField::Altura,
    ];

    /// Key used both in the JSON body and in the stored document.
    pub const fn key(self) -> &'static str {
        match self {
            CaballeroField::Nombre => "nombre",
            CaballeroField::Constelacion => "constelacion",
            CaballeroField::Edad => "edad",
            CaballeroField::UrlImagen => "urlImagen",
            CaballeroField::Altura => "altura",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<&FieldValue> for Bson {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => Bson::String(s.clone()),
            // int32 when it fits, int64 otherwise
            FieldValue::Integer(i) => match i32::try_from(*i) {
                Ok(small) => Bson::Int32(small),
                Err(_) => Bson::Int64(*i),
            },
            FieldValue::Float(f) => Bson::Double(*f),
        }
    }
}

/// One field assignment, typed by the field it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Nombre(String),
    Constelacion(String),
    Edad(i64),
    UrlImagen(String),
    Altura(f64),
}

impl Change {
    pub fn field(&self) -> CaballeroField {
        match self {
            Change::Nombre(_) => CaballeroField::Nombre,
            Change::Constelacion(_) => CaballeroField::Constelacion,
            Change::Edad(_) => CaballeroField::Edad,
            Change::UrlImagen(_) => CaballeroField::UrlImagen,
            Change::Altura(_) => CaballeroField::Altura,
        }
    }

    pub fn value(&self) -> FieldValue {
        match self {
            Change::Nombre(v) | Change::Constelacion(v) | Change::UrlImagen(v) => FieldValue::Text(v.clone()),
            Change::Edad(v) => FieldValue::Integer(*v),
            Change::Altura(v) => FieldValue::Float(*v),
        }
    }
}

/// `PUT /caballeros/{id}` body. Absent and `null` keys both land as `None`.
///
/// Numeric fields are lenient the way HTML forms need: `edad` takes an integer,
/// a whole float (`15.0`) or a numeric string (`"15"`); `altura` takes any
/// number or a numeric string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaballeroUpdate {
    pub nombre: Option<String>,
    pub constelacion: Option<String>,
    #[serde(default, deserialize_with = "lax::int")]
    pub edad: Option<i64>,
    #[serde(rename = "urlImagen")]
    pub url_imagen: Option<String>,
    #[serde(default, deserialize_with = "lax::float")]
    pub altura: Option<f64>,
}

impl CaballeroUpdate {
    pub fn change_for(&self, field: CaballeroField) -> Option<Change> {
        match field {
            CaballeroField::Nombre => self.nombre.clone().map(Change::Nombre),
            CaballeroField::Constelacion => self.constelacion.clone().map(Change::Constelacion),
            CaballeroField::Edad => self.edad.map(Change::Edad),
            CaballeroField::UrlImagen => self.url_imagen.clone().map(Change::UrlImagen),
            CaballeroField::Altura => self.altura.map(Change::Altura),
        }
    }
}

mod lax {
    use std::fmt;

    use serde::de::{self, Deserializer, Unexpected, Visitor};

    // i64 range as f64: [-2^63, 2^63)
    const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
    const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

    fn whole(f: f64) -> Option<i64> {
        (f.is_finite() && f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&f)).then_some(f as i64)
    }

    struct IntVisitor;

    impl<'de> Visitor<'de> for IntVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer, a whole number or a numeric string")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            i64::try_from(v).map(Some).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            whole(v).map(Some).ok_or_else(|| E::invalid_value(Unexpected::Float(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let t = v.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().and_then(whole))
                .map(Some)
                .ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            // NaN/inf would serialize back as null in the echo
            match v.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Some(f)),
                _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
            }
        }
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        d.deserialize_option(IntVisitor)
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        d.deserialize_option(FloatVisitor)
    }
}

/// Fields to `$set`, serialized as a JSON object for the `cambios` echo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    entries: Vec<Change>,
}

impl ChangeSet {
    pub fn from_update(update: &CaballeroUpdate) -> Self {
        let entries = CaballeroField::ALL.iter().filter_map(|field| update.change_for(*field)).collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, field: CaballeroField) -> Option<FieldValue> {
        self.entries.iter().find(|c| c.field() == field).map(Change::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.entries.iter()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|c| c.field().key()).collect()
    }

    /// Fields as a BSON document, keyed by stored attribute name.
    pub fn to_document(&self) -> Document {
        let mut out = Document::new();
        for change in &self.entries {
            out.insert(change.field().key(), Bson::from(&change.value()));
        }
        out
    }

    /// Update modifier for `update_one`.
    pub fn to_set_document(&self) -> Document {
        doc! { "$set": self.to_document() }
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for change in &self.entries {
            map.serialize_entry(change.field().key(), &change.value())?;
        }
        map.end()
    }
}

/// Parse the canonical 24-hex-character form of an ObjectId.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, ModelError> {
    ObjectId::parse_str(raw).map_err(|_| ModelError::InvalidId(raw.to_string()))
}
