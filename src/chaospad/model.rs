use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A pad as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl Pad {
    pub fn new(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            content: Some(content.into()),
            updated_at: now,
            created_at: Some(now),
            user_id: None,
            extra: Map::new(),
        }
    }

    /// String value of a table field, as it would appear in a cell or a CSV row.
    ///
    /// Unknown fields are looked up in `extra`; missing values render empty.
    pub fn field_value(&self, field: &str) -> String {
        match field {
            "id" => self.id.clone(),
            "name" => self.name.clone(),
            "content" => self.content.clone().unwrap_or_default(),
            "updated_at" => format_timestamp(&self.updated_at),
            "created_at" => self
                .created_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
            "user_id" => self.user_id.clone().unwrap_or_default(),
            other => match self.extra.get(other) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(v) => v.to_string(),
            },
        }
    }
}

/// The in-progress copy of a pad held by the create/edit dialog.
///
/// Every field is optional: a fresh draft is `{name: null}`, an edit draft is a
/// copy of the selected row. `name` is always serialized so a blank draft still
/// sends `"name": null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PadDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
}

impl PadDraft {
    pub fn blank() -> Self {
        Self::default()
    }

    /// The id of the record being edited, if any. An empty id counts as none.
    pub fn target_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is_update(&self) -> bool {
        self.target_id().is_some()
    }

    /// JSON body for a create/update request, with `extra` defaulted to `{}`.
    pub fn to_request_body(&self) -> serde_json::Result<Value> {
        let mut body = self.clone();
        if body.extra.is_none() {
            body.extra = Some(Map::new());
        }
        serde_json::to_value(body)
    }
}

impl From<&Pad> for PadDraft {
    fn from(pad: &Pad) -> Self {
        Self {
            id: Some(pad.id.clone()),
            name: Some(pad.name.clone()),
            content: pad.content.clone(),
            updated_at: Some(pad.updated_at),
            created_at: pad.created_at,
            user_id: pad.user_id.clone(),
            extra: Some(pad.extra.clone()),
        }
    }
}

/// One server-side page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
}

/// Response body of a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleStatus {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A table column definition; drives both rendering and CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub label: &'static str,
    pub field: &'static str,
    pub align: Align,
    pub sortable: bool,
}

impl Column {
    const fn left(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            field: name,
            align: Align::Left,
            sortable: true,
        }
    }
}

/// Columns of the pads table, in display order.
pub fn pad_columns() -> Vec<Column> {
    vec![
        Column::left("name", "Pad name"),
        Column::left("content", "content"),
        Column::left("updated_at", "Updated At"),
        Column::left("id", "ID"),
    ]
}

/// RFC 3339 in UTC, keeping whatever sub-second precision the value has.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Ids arrive as strings from the backend, but numeric ids are accepted too.
mod id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match RawId::deserialize(d)? {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Uint(n) => n.to_string(),
        })
    }
}

/// Lenient wire timestamps.
///
/// Accepts RFC 3339, naive ISO datetimes (taken as UTC), bare dates and unix
/// seconds. Always writes RFC 3339 UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an ISO 8601 timestamp, a date, or unix seconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse(v).ok_or_else(|| E::custom(format!("unrecognized timestamp: {v}")))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            DateTime::from_timestamp(v, 0)
                .ok_or_else(|| E::custom(format!("timestamp out of range: {v}")))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            let secs = i64::try_from(v).map_err(|_| E::custom("timestamp out of range"))?;
            self.visit_i64(secs)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            let secs = v.trunc() as i64;
            let nanos = (v.fract().abs() * 1e9) as u32;
            DateTime::from_timestamp(secs, nanos)
                .ok_or_else(|| E::custom(format!("timestamp out of range: {v}")))
        }
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        d.deserialize_any(TimestampVisitor)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super")] DateTime<Utc>);

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => super::serialize(ts, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Ok(Option::<Wrapped>::deserialize(d)?.map(|w| w.0))
        }
    }
}
