use std::fmt;
use thiserror::Error;

/// Erreurs de résolution d'options par nom
#[derive(Debug, Error, PartialEq)]
pub enum OptionError {
    #[error("Option inconnue: {0}")]
    UnknownOption(String),

    #[error("Profil inconnu: {0}")]
    UnknownProfile(String),

    #[error("Type invalide pour {name}: attendu {expected}, reçu {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: OptionValue,
    },
}

/// Valeur typée d'une option lue ou écrite par son nom
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    /// Option non renseignée (ex: bitrate absent)
    Unset,
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            OptionValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Float(v) => write!(f, "{}", v),
            OptionValue::Text(s) => write!(f, "{}", s),
            OptionValue::List(items) => write!(f, "[{}]", items.join(", ")),
            OptionValue::Unset => write!(f, "<vide>"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<u16> for OptionValue {
    fn from(value: u16) -> Self {
        OptionValue::Int(value.into())
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(value.into())
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(value.into())
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<&String> for OptionValue {
    fn from(value: &String) -> Self {
        OptionValue::Text(value.clone())
    }
}

impl From<&Option<String>> for OptionValue {
    fn from(value: &Option<String>) -> Self {
        match value {
            Some(s) => OptionValue::Text(s.clone()),
            None => OptionValue::Unset,
        }
    }
}

impl From<&Vec<String>> for OptionValue {
    fn from(value: &Vec<String>) -> Self {
        OptionValue::List(value.clone())
    }
}

/// Accès par nom aux champs d'un enregistrement de réglages
pub trait NamedOptions {
    /// Lire un champ par son nom (None si le nom est inconnu)
    fn get_option(&self, name: &str) -> Option<OptionValue>;

    /// Écrire un champ par son nom
    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError>;

    /// Noms de tous les champs accessibles
    fn option_names(&self) -> &'static [&'static str];

    /// Lire un champ, ou `UnknownOption` s'il n'existe pas
    fn require_option(&self, name: &str) -> Result<OptionValue, OptionError> {
        self.get_option(name)
            .ok_or_else(|| OptionError::UnknownOption(name.to_string()))
    }
}

fn mismatch(name: &str, expected: &'static str, found: OptionValue) -> OptionError {
    OptionError::TypeMismatch {
        name: name.to_string(),
        expected,
        found,
    }
}

pub(crate) fn expect_bool(name: &str, value: OptionValue) -> Result<bool, OptionError> {
    value.as_bool().ok_or_else(|| mismatch(name, "bool", value))
}

pub(crate) fn expect_u32(name: &str, value: OptionValue) -> Result<u32, OptionError> {
    value
        .as_int()
        .and_then(|i| u32::try_from(i).ok())
        .ok_or_else(|| mismatch(name, "entier positif", value))
}

pub(crate) fn expect_u16(name: &str, value: OptionValue) -> Result<u16, OptionError> {
    value
        .as_int()
        .and_then(|i| u16::try_from(i).ok())
        .ok_or_else(|| mismatch(name, "entier positif", value))
}

pub(crate) fn expect_i32(name: &str, value: OptionValue) -> Result<i32, OptionError> {
    value
        .as_int()
        .and_then(|i| i32::try_from(i).ok())
        .ok_or_else(|| mismatch(name, "entier", value))
}

pub(crate) fn expect_text(name: &str, value: OptionValue) -> Result<String, OptionError> {
    match value {
        OptionValue::Text(s) => Ok(s),
        other => Err(mismatch(name, "texte", other)),
    }
}

pub(crate) fn expect_opt_text(name: &str, value: OptionValue) -> Result<Option<String>, OptionError> {
    match value {
        OptionValue::Text(s) => Ok(Some(s)),
        OptionValue::Unset => Ok(None),
        other => Err(mismatch(name, "texte ou vide", other)),
    }
}

pub(crate) fn expect_list(name: &str, value: OptionValue) -> Result<Vec<String>, OptionError> {
    match value {
        OptionValue::List(items) => Ok(items),
        other => Err(mismatch(name, "liste", other)),
    }
}

pub(crate) fn unknown(name: &str) -> OptionError {
    OptionError::UnknownOption(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_u32_rejects_negative() {
        assert_eq!(expect_u32("crf", OptionValue::Int(18)), Ok(18));
        assert!(matches!(
            expect_u32("crf", OptionValue::Int(-1)),
            Err(OptionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_opt_text_accepts_unset() {
        assert_eq!(expect_opt_text("bitrate", OptionValue::Unset), Ok(None));
        assert_eq!(
            expect_opt_text("bitrate", "6000k".into()),
            Ok(Some("6000k".to_string()))
        );
        assert!(expect_opt_text("bitrate", OptionValue::Bool(true)).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(OptionValue::from(true).to_string(), "true");
        assert_eq!(
            OptionValue::List(vec!["a".into(), "b".into()]).to_string(),
            "[a, b]"
        );
        assert_eq!(OptionValue::Unset.to_string(), "<vide>");
    }
}
