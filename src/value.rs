//! Dynamically typed values seen by filter expressions.

use std::fmt;

use crate::header::{InfoField, InfoNumber, InfoType};

/// A field value of a variant call.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    /// Multi-valued fields (lists in INFO, hotspot IDs, FILTER).
    Array(Vec<Value>),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Truth value of a filter result. Missing counts as false.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Missing => Some(false),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Missing => "missing",
        }
    }

    /// Convert a raw VCF value using its header definition, if one exists.
    ///
    /// `.` is missing. Flags become `true`. Comma lists become arrays unless
    /// the definition says the field holds a single value.
    pub fn from_vcf(raw: &str, definition: Option<&InfoField>) -> Value {
        if raw == "." {
            return Value::Missing;
        }

        let Some(def) = definition else {
            return Self::infer(raw);
        };

        if def.number == InfoNumber::Flag || def.field_type == InfoType::Flag {
            return Value::Bool(true);
        }

        let convert = |item: &str| -> Value {
            if item == "." {
                return Value::Missing;
            }
            match def.field_type {
                InfoType::Integer | InfoType::Float => item
                    .parse::<f64>()
                    .map(Value::Number)
                    .unwrap_or_else(|_| Value::String(item.to_string())),
                _ => Value::String(item.to_string()),
            }
        };

        match def.number {
            InfoNumber::Count(1) => convert(raw),
            _ => {
                let mut values: Vec<Value> = raw.split(',').map(convert).collect();
                if values.len() == 1 {
                    values.remove(0)
                } else {
                    Value::Array(values)
                }
            }
        }
    }

    /// Best-effort typing when no header definition is available.
    fn infer(raw: &str) -> Value {
        if let Ok(n) = raw.parse::<f64>() {
            return Value::Number(n);
        }
        if raw.contains(',') {
            return Value::Array(raw.split(',').map(Self::infer).collect());
        }
        Value::String(raw.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Array(arr) => {
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            Value::Missing => write!(f, "."),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(number: InfoNumber, field_type: InfoType) -> InfoField {
        InfoField {
            id: "X".to_string(),
            number,
            field_type,
            description: String::new(),
        }
    }

    #[test]
    fn test_typed_conversion() {
        let fdp = def(InfoNumber::Count(1), InfoType::Integer);
        assert_eq!(Value::from_vcf("1516", Some(&fdp)), Value::Number(1516.0));

        let fao = def(InfoNumber::PerAltAllele, InfoType::Integer);
        assert_eq!(
            Value::from_vcf("12,0", Some(&fao)),
            Value::Array(vec![Value::Number(12.0), Value::Number(0.0)])
        );
        assert_eq!(Value::from_vcf("12", Some(&fao)), Value::Number(12.0));

        let hs = def(InfoNumber::Flag, InfoType::Flag);
        assert_eq!(Value::from_vcf("", Some(&hs)), Value::Bool(true));
    }

    #[test]
    fn test_missing_and_inferred() {
        assert_eq!(Value::from_vcf(".", None), Value::Missing);
        assert_eq!(Value::from_vcf("0.25", None), Value::Number(0.25));
        assert_eq!(Value::from_vcf("snp", None), Value::String("snp".into()));
        assert_eq!(
            Value::from_vcf("snp,del", None),
            Value::Array(vec!["snp".into(), "del".into()])
        );
    }

    #[test]
    fn test_display_joins_arrays() {
        let v = Value::from(vec!["COSM6224", "COSM12979"]);
        assert_eq!(v.to_string(), "COSM6224,COSM12979");
        assert_eq!(Value::Missing.to_string(), ".");
    }
}
