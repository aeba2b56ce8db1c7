//! Default-value synthesis.
//!
//! [`ValueGenerator::generate`] produces a Rust expression for one parameter.
//! With `randomize = false` the result depends only on the descriptor, so
//! repeated runs produce byte-identical output. With `randomize = true` values
//! are drawn from the generator's RNG; seeding it makes randomized output
//! reproducible.
//!
//! Nullable parameters: in randomized mode a fair coin picks `None` first;
//! otherwise the value is wrapped in `Some(...)`.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::error::FixtureError;
use crate::parameter::{CollectionKind, KnownTypeKind, ParameterDescriptor, PrimitiveKind};
use crate::registry::AdapterRegistry;
use crate::types::ResolvedType;

/// Characters used for randomized `String` and `char` values.
pub const ALLOWED_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Zones picked from for randomized `chrono_tz::Tz` values.
const ZONES: &[&str] = &[
    "UTC",
    "Europe__Athens",
    "Europe__London",
    "America__New_York",
    "America__Sao_Paulo",
    "Asia__Tokyo",
    "Australia__Sydney",
];

const EPOCH_UTC: &str = "::chrono::DateTime::<::chrono::Utc>::from_timestamp(0, 0).unwrap()";

/// Produces default-value expressions.
pub struct ValueGenerator<R = StdRng> {
    rng: R,
}

impl ValueGenerator<StdRng> {
    /// Seeded generator, or one seeded from the OS when `seed` is `None`.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        ValueGenerator { rng }
    }
}

impl<R: Rng> ValueGenerator<R> {
    /// Default-value expression for `param`.
    pub fn generate(
        &mut self,
        randomize: bool,
        param: &ParameterDescriptor,
        adapters: &AdapterRegistry,
    ) -> Result<String, FixtureError> {
        let ty = param.ty();
        if ty.nullable && randomize && self.rng.random_bool(0.5) {
            return Ok("None".to_string());
        }
        let (value, already_optional) = self.value(randomize, param, adapters)?;
        if ty.nullable && !already_optional {
            Ok(format!("Some({})", value))
        } else {
            Ok(value)
        }
    }

    /// The non-null value, and whether it already has `Option` type.
    fn value(
        &mut self,
        randomize: bool,
        param: &ParameterDescriptor,
        adapters: &AdapterRegistry,
    ) -> Result<(String, bool), FixtureError> {
        let value = match param {
            ParameterDescriptor::Primitive { name, ty, kind } => {
                self.primitive(randomize, name, ty, *kind)
            }
            ParameterDescriptor::KnownType { kind, .. } => self.known_type(randomize, *kind),
            ParameterDescriptor::Fixture { factory, .. } => factory.call(),
            ParameterDescriptor::Enum { name, ty, entries } => {
                let entry = self.pick(randomize, entries, ty, name)?;
                format!("{}::{}", ty.path, entry)
            }
            ParameterDescriptor::Sealed { name, ty, entries } => {
                let entry = self.pick(randomize, entries, ty, name)?;
                if entry.is_singleton {
                    format!("{}::{}", ty.path, entry.name)
                } else {
                    match (&entry.factory, entry.is_fixture) {
                        (Some(factory), true) => {
                            format!("{}::{}({})", ty.path, entry.name, factory.call())
                        }
                        _ => {
                            return Err(FixtureError::SealedCaseNotFixture {
                                sealed: ty.path.clone(),
                                case: entry.name.clone(),
                                field: name.clone(),
                            })
                        }
                    }
                }
            }
            ParameterDescriptor::Collection { ty, kind, .. } => match kind {
                CollectionKind::Array => "Box::default()".to_string(),
                CollectionKind::List | CollectionKind::Set | CollectionKind::Map => {
                    format!("{}::new()", ty.path)
                }
            },
            ParameterDescriptor::AdapterSupplied { name, ty } => {
                let adapter = adapters
                    .lookup(ty)
                    .ok_or_else(|| FixtureError::MissingAdapter {
                        type_name: ty.render_non_null(),
                        field: name.clone(),
                    })?;
                return Ok((adapter.call(), adapter.target.nullable));
            }
        };
        Ok((value, false))
    }

    fn pick<'e, T>(
        &mut self,
        randomize: bool,
        entries: &'e [T],
        ty: &ResolvedType,
        field: &str,
    ) -> Result<&'e T, FixtureError> {
        let entry = if randomize {
            entries.choose(&mut self.rng)
        } else {
            entries.first()
        };
        entry.ok_or_else(|| FixtureError::EmptyVariants {
            type_name: ty.path.clone(),
            field: field.to_string(),
        })
    }

    fn primitive(
        &mut self,
        randomize: bool,
        name: &str,
        ty: &ResolvedType,
        kind: PrimitiveKind,
    ) -> String {
        match (kind, randomize) {
            (PrimitiveKind::String, false) => {
                let name = name.strip_prefix("r#").unwrap_or(name);
                format!("String::from({:?})", name)
            }
            (PrimitiveKind::String, true) => {
                let len = self.rng.random_range(1..=10);
                let text: String = (0..len).map(|_| self.random_char()).collect();
                format!("String::from({:?})", text)
            }
            (PrimitiveKind::Char, false) => format!("{:?}", char::from(ALLOWED_CHARS[0])),
            (PrimitiveKind::Char, true) => format!("{:?}", self.random_char()),
            (PrimitiveKind::Boolean, false) => "false".to_string(),
            (PrimitiveKind::Boolean, true) => self.rng.random_bool(0.5).to_string(),
            (PrimitiveKind::Int, false) => "0".to_string(),
            (PrimitiveKind::Int, true) => self.rng.random_range(0..20).to_string(),
            (PrimitiveKind::Long, false) => format!("0_{}", ty.simple_name()),
            (PrimitiveKind::Long, true) => {
                format!("{}_{}", self.rng.random_range(0..20), ty.simple_name())
            }
            (PrimitiveKind::Float, false) => "0.0_f32".to_string(),
            (PrimitiveKind::Float, true) => format!("{:?}_f32", self.rng.random::<f32>()),
            (PrimitiveKind::Double, false) => "0.0".to_string(),
            (PrimitiveKind::Double, true) => format!("{:?}", self.rng.random_range(0.0..20.0)),
        }
    }

    fn known_type(&mut self, randomize: bool, kind: KnownTypeKind) -> String {
        if !randomize {
            return deterministic_known_type(kind);
        }
        match kind {
            KnownTypeKind::Date => "::std::time::SystemTime::now()".to_string(),
            KnownTypeKind::TimeZone => {
                let hours: i32 = self.rng.random_range(-12..=14);
                format!("::chrono::FixedOffset::east_opt({}).unwrap()", hours * 3600)
            }
            KnownTypeKind::Uuid => "::uuid::Uuid::new_v4()".to_string(),
            KnownTypeKind::LocalDate => "::chrono::Local::now().date_naive()".to_string(),
            KnownTypeKind::LocalTime => "::chrono::Local::now().time()".to_string(),
            KnownTypeKind::LocalDateTime => "::chrono::Local::now().naive_local()".to_string(),
            KnownTypeKind::ZonedDateTime => {
                "::chrono::Utc::now().with_timezone(&::chrono_tz::Tz::UTC)".to_string()
            }
            KnownTypeKind::Instant => "::chrono::Utc::now()".to_string(),
            KnownTypeKind::OffsetTime => format!(
                "::chrono::TimeDelta::seconds({})",
                self.rng.random_range(0..86_400)
            ),
            KnownTypeKind::StdDuration => format!(
                "::std::time::Duration::from_secs({})",
                self.rng.random_range(0..86_400)
            ),
            KnownTypeKind::OffsetDateTime => "::chrono::Local::now().fixed_offset()".to_string(),
            KnownTypeKind::ZoneId => {
                let zone = ZONES.choose(&mut self.rng).copied().unwrap_or("UTC");
                format!("::chrono_tz::Tz::{}", zone)
            }
            KnownTypeKind::BigDecimal => format!(
                "<::bigdecimal::BigDecimal as ::std::str::FromStr>::from_str(\"{:?}\").unwrap()",
                self.rng.random_range(0.0..20.0)
            ),
            KnownTypeKind::BigInteger => format!(
                "::num_bigint::BigInt::from({})",
                self.rng.random_range(0..20)
            ),
        }
    }

    fn random_char(&mut self) -> char {
        let byte = ALLOWED_CHARS.choose(&mut self.rng).copied().unwrap_or(b'A');
        char::from(byte)
    }
}

fn deterministic_known_type(kind: KnownTypeKind) -> String {
    match kind {
        KnownTypeKind::Date => "::std::time::SystemTime::UNIX_EPOCH".to_string(),
        KnownTypeKind::TimeZone => "::chrono::FixedOffset::east_opt(0).unwrap()".to_string(),
        KnownTypeKind::Uuid => "::uuid::Uuid::nil()".to_string(),
        KnownTypeKind::LocalDate => "::chrono::NaiveDate::from_ymd_opt(1989, 1, 23).unwrap()".to_string(),
        KnownTypeKind::LocalTime => "::chrono::NaiveTime::MIN".to_string(),
        KnownTypeKind::LocalDateTime => {
            "::chrono::NaiveDate::from_ymd_opt(1989, 1, 23).unwrap().and_hms_opt(0, 0, 0).unwrap()"
                .to_string()
        }
        KnownTypeKind::ZonedDateTime => {
            "::chrono::TimeZone::with_ymd_and_hms(&::chrono_tz::Tz::UTC, 1989, 1, 23, 0, 0, 0).unwrap()"
                .to_string()
        }
        KnownTypeKind::Instant => EPOCH_UTC.to_string(),
        KnownTypeKind::OffsetTime => "::chrono::TimeDelta::zero()".to_string(),
        KnownTypeKind::StdDuration => "::std::time::Duration::ZERO".to_string(),
        KnownTypeKind::OffsetDateTime => format!("{}.fixed_offset()", EPOCH_UTC),
        KnownTypeKind::ZoneId => "::chrono_tz::Tz::UTC".to_string(),
        KnownTypeKind::BigDecimal => "::bigdecimal::BigDecimal::from(0)".to_string(),
        KnownTypeKind::BigInteger => "::num_bigint::BigInt::from(0)".to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
