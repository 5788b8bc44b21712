//! Declarative constraint metadata.
//!
//! Each entity lists its column rules once through [`Constrained`]. Rules that can be decided by
//! looking at a single value are checked here. `Unique` and `References` need the store and are
//! enforced by the access layer, which reads them from the same metadata.

use sea_orm::prelude::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue, EntityName, EntityTrait, IdenStatic, ModelTrait, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must be present; text must not be blank.
    Required,
    /// No two rows may share the value.
    Unique,
    Email,
    /// Closed enumeration, stored as text.
    OneOf(&'static [&'static str]),
    AtLeast(i64),
    /// Inclusive integer range. Absent values pass.
    Between(i64, i64),
    NonNegative,
    /// Fixed-point number with at most `precision` digits, `scale` of them after the point.
    Decimal { precision: u32, scale: u32 },
    /// Foreign key to the primary key of the named table.
    References(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint<C: 'static> {
    pub column: C,
    pub rule: Rule,
}

impl<C> Constraint<C> {
    pub const fn new(column: C, rule: Rule) -> Self {
        Self { column, rule }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("value is required")]
    Missing,
    #[error("`{0}` is not an e-mail address")]
    InvalidEmail(String),
    #[error("`{value}` is not one of {allowed:?}")]
    NotAllowed {
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("{value} is below the minimum of {min}")]
    BelowMinimum { value: i64, min: i64 },
    #[error("{value} is outside of [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },
    #[error("{0} is negative")]
    Negative(String),
    #[error("{value} does not fit decimal({precision}, {scale})")]
    Precision { value: String, precision: u32, scale: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {table}.{column}: {violation}")]
pub struct ValidationError {
    pub table: String,
    pub column: String,
    #[source]
    pub violation: Violation,
}

impl ValidationError {
    pub fn new(table: impl Into<String>, column: impl Into<String>, violation: Violation) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            violation,
        }
    }
}

impl Rule {
    pub fn check(&self, value: &Value) -> Result<(), Violation> {
        match *self {
            Self::Required => match value {
                Value::String(Some(text)) if text.trim().is_empty() => Err(Violation::Missing),
                value if is_null(value) => Err(Violation::Missing),
                _ => Ok(()),
            },
            Self::Email => match value {
                Value::String(Some(text)) if !is_email(text) => Err(Violation::InvalidEmail(text.to_string())),
                _ => Ok(()),
            },
            Self::OneOf(allowed) => match value {
                Value::String(Some(text)) if !allowed.contains(&text.as_str()) => Err(Violation::NotAllowed {
                    value: text.to_string(),
                    allowed,
                }),
                _ => Ok(()),
            },
            Self::AtLeast(min) => match integer(value) {
                Some(value) if value < min => Err(Violation::BelowMinimum { value, min }),
                _ => Ok(()),
            },
            Self::Between(min, max) => match integer(value) {
                Some(value) if !(min..=max).contains(&value) => Err(Violation::OutOfRange { value, min, max }),
                _ => Ok(()),
            },
            Self::NonNegative => match value {
                Value::Decimal(Some(amount)) if amount.is_sign_negative() && !amount.is_zero() => {
                    Err(Violation::Negative(amount.to_string()))
                }
                value => match integer(value) {
                    Some(value) if value < 0 => Err(Violation::Negative(value.to_string())),
                    _ => Ok(()),
                },
            },
            Self::Decimal { precision, scale } => match value {
                Value::Decimal(Some(amount)) if !fits(amount, precision, scale) => Err(Violation::Precision {
                    value: amount.to_string(),
                    precision,
                    scale,
                }),
                _ => Ok(()),
            },
            Self::Unique | Self::References(_) => Ok(()),
        }
    }
}

fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::String(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::Decimal(None)
            | Value::ChronoDate(None)
            | Value::ChronoDateTime(None)
    )
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::TinyInt(Some(value)) => Some(i64::from(*value)),
        Value::SmallInt(Some(value)) => Some(i64::from(*value)),
        Value::Int(Some(value)) => Some(i64::from(*value)),
        Value::BigInt(Some(value)) => Some(*value),
        _ => None,
    }
}

fn fits(amount: &Decimal, precision: u32, scale: u32) -> bool {
    if amount.normalize().scale() > scale {
        return false;
    }
    let digits = precision.saturating_sub(scale);
    let integral = amount.trunc().abs();
    10u64
        .checked_pow(digits)
        .is_none_or(|limit| integral < Decimal::from(limit))
}

fn is_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() > 1
        && domain.split('.').all(|label| !label.is_empty())
        && !text.chars().any(char::is_whitespace)
}

/// Constraint metadata of an entity.
pub trait Constrained: EntityTrait {
    fn constraints() -> &'static [Constraint<Self::Column>];

    fn unique_columns() -> impl Iterator<Item = Self::Column> {
        Self::constraints()
            .iter()
            .filter(|constraint| constraint.rule == Rule::Unique)
            .map(|constraint| constraint.column)
    }

    /// Foreign key columns together with the table they point to.
    fn references() -> impl Iterator<Item = (Self::Column, &'static str)> {
        Self::constraints().iter().filter_map(|constraint| match constraint.rule {
            Rule::References(table) => Some((constraint.column, table)),
            _ => None,
        })
    }

    fn validate_model(model: &Self::Model) -> Result<(), ValidationError> {
        validate_values::<Self>(|column| Some(model.get(column)))
    }

    /// Checks only the columns that are `Set` on the active model.
    fn validate_changes<A>(model: &A) -> Result<(), ValidationError>
    where
        A: ActiveModelTrait<Entity = Self>,
    {
        validate_values::<Self>(|column| match model.get(column) {
            ActiveValue::Set(value) => Some(value),
            ActiveValue::Unchanged(_) | ActiveValue::NotSet => None,
        })
    }
}

pub fn validate_values<E: Constrained>(
    mut value_of: impl FnMut(E::Column) -> Option<Value>,
) -> Result<(), ValidationError> {
    for constraint in E::constraints() {
        let Some(value) = value_of(constraint.column) else {
            continue;
        };
        constraint.rule.check(&value).map_err(|violation| {
            ValidationError::new(
                E::default().table_name().to_owned(),
                constraint.column.as_str(),
                violation,
            )
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Value {
        Value::from(value.to_owned())
    }

    #[test]
    fn required_rejects_blank_and_null() {
        assert_eq!(Rule::Required.check(&text("  ")), Err(Violation::Missing));
        assert_eq!(Rule::Required.check(&Value::String(None)), Err(Violation::Missing));
        assert_eq!(Rule::Required.check(&text("Taro")), Ok(()));
    }

    #[test]
    fn email_shape() {
        assert!(Rule::Email.check(&text("taro@example.com")).is_ok());
        for invalid in ["taro", "@example.com", "taro@", "taro@example", "ta ro@example.com", "a@b@c.d"] {
            assert_eq!(
                Rule::Email.check(&text(invalid)),
                Err(Violation::InvalidEmail(invalid.to_owned())),
                "{invalid}"
            );
        }
    }

    #[test]
    fn one_of() {
        const ALLOWED: &[&str] = &["active", "completed"];
        assert!(Rule::OneOf(ALLOWED).check(&text("active")).is_ok());
        assert_eq!(
            Rule::OneOf(ALLOWED).check(&text("paused")),
            Err(Violation::NotAllowed {
                value: "paused".to_owned(),
                allowed: ALLOWED
            })
        );
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(
            Rule::AtLeast(1).check(&Value::Int(Some(0))),
            Err(Violation::BelowMinimum { value: 0, min: 1 })
        );
        assert!(Rule::AtLeast(1).check(&Value::Int(Some(45))).is_ok());
        assert!(Rule::Between(1, 5).check(&Value::Int(Some(5))).is_ok());
        assert!(Rule::Between(1, 5).check(&Value::Int(None)).is_ok());
        assert_eq!(
            Rule::Between(1, 5).check(&Value::Int(Some(6))),
            Err(Violation::OutOfRange { value: 6, min: 1, max: 5 })
        );
    }

    #[test]
    fn non_negative_decimal() {
        assert!(Rule::NonNegative.check(&Value::from(Decimal::ZERO)).is_ok());
        assert!(Rule::NonNegative.check(&Value::from(Decimal::new(500_000, 2))).is_ok());
        assert_eq!(
            Rule::NonNegative.check(&Value::from(Decimal::new(-1, 2))),
            Err(Violation::Negative("-0.01".to_owned()))
        );
    }

    #[test]
    fn decimal_precision_and_scale() {
        const PRICE: Rule = Rule::Decimal { precision: 10, scale: 2 };
        assert!(PRICE.check(&Value::from(Decimal::new(500_000, 2))).is_ok());
        assert!(PRICE.check(&Value::from(Decimal::new(1_250, 3))).is_ok());
        assert!(PRICE.check(&Value::from(Decimal::new(9_999_999_999, 2))).is_ok());
        assert_eq!(
            PRICE.check(&Value::from(Decimal::new(12_345, 3))),
            Err(Violation::Precision {
                value: "12.345".to_owned(),
                precision: 10,
                scale: 2
            })
        );
        assert_eq!(
            PRICE.check(&Value::from(Decimal::new(123_456_789_012, 2))),
            Err(Violation::Precision {
                value: "1234567890.12".to_owned(),
                precision: 10,
                scale: 2
            })
        );
        assert!(PRICE.check(&Value::Decimal(None)).is_ok());
    }
}
