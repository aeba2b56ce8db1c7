//! Parameter descriptors and the allow-lists behind them.
//!
//! Every field of a fixture is classified into exactly one
//! [`ParameterDescriptor`] variant. The variant decides how its default value
//! is synthesized.

use serde::Serialize;

use crate::naming::FactoryRef;
use crate::types::ResolvedType;

// ============================================================================
// Primitive Kinds
// ============================================================================

/// Primitive field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Char,
    Boolean,
    /// `i8 i16 i32 u8 u16 u32`.
    Int,
    /// `i64 u64 i128 u128 isize usize`.
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    /// Classify by simple name.
    pub fn of(ty: &ResolvedType) -> Option<PrimitiveKind> {
        let kind = match ty.simple_name() {
            "String" => PrimitiveKind::String,
            "char" => PrimitiveKind::Char,
            "bool" => PrimitiveKind::Boolean,
            "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => PrimitiveKind::Int,
            "i64" | "u64" | "i128" | "u128" | "isize" | "usize" => PrimitiveKind::Long,
            "f32" => PrimitiveKind::Float,
            "f64" => PrimitiveKind::Double,
            _ => return None,
        };
        Some(kind)
    }
}

// ============================================================================
// Known Types
// ============================================================================

/// Well-known library types with fixed default constructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownTypeKind {
    /// `std::time::SystemTime`
    Date,
    /// `chrono::FixedOffset`
    TimeZone,
    /// `uuid::Uuid`
    Uuid,
    /// `chrono::NaiveDate`
    LocalDate,
    /// `chrono::NaiveTime`
    LocalTime,
    /// `chrono::NaiveDateTime`
    LocalDateTime,
    /// `chrono::DateTime<chrono_tz::Tz>`
    ZonedDateTime,
    /// `chrono::DateTime<chrono::Utc>`
    Instant,
    /// `chrono::TimeDelta` (also spelled `chrono::Duration`)
    OffsetTime,
    /// `std::time::Duration`
    StdDuration,
    /// `chrono::DateTime<chrono::FixedOffset>`
    OffsetDateTime,
    /// `chrono_tz::Tz`
    ZoneId,
    /// `bigdecimal::BigDecimal`
    BigDecimal,
    /// `num_bigint::BigInt`
    BigInteger,
}

impl KnownTypeKind {
    /// Classify by simple name (and the first type argument for `DateTime`).
    pub fn of(ty: &ResolvedType) -> Option<KnownTypeKind> {
        let kind = match ty.simple_name() {
            "SystemTime" => KnownTypeKind::Date,
            "FixedOffset" => KnownTypeKind::TimeZone,
            "Uuid" => KnownTypeKind::Uuid,
            "NaiveDate" => KnownTypeKind::LocalDate,
            "NaiveTime" => KnownTypeKind::LocalTime,
            "NaiveDateTime" => KnownTypeKind::LocalDateTime,
            "DateTime" => {
                let zone = ty.args.first()?;
                match zone.simple_name() {
                    "Tz" => KnownTypeKind::ZonedDateTime,
                    "Utc" => KnownTypeKind::Instant,
                    "FixedOffset" => KnownTypeKind::OffsetDateTime,
                    _ => return None,
                }
            }
            "TimeDelta" => KnownTypeKind::OffsetTime,
            "Duration" if ty.path.starts_with("chrono::") => KnownTypeKind::OffsetTime,
            "Duration" => KnownTypeKind::StdDuration,
            "Tz" => KnownTypeKind::ZoneId,
            "BigDecimal" => KnownTypeKind::BigDecimal,
            "BigInt" => KnownTypeKind::BigInteger,
            _ => return None,
        };
        Some(kind)
    }
}

// ============================================================================
// Collections
// ============================================================================

/// Supported container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// `Box<[T]>`
    Array,
    /// `Vec`, `VecDeque`, `LinkedList`
    List,
    /// `HashSet`, `BTreeSet`
    Set,
    /// `HashMap`, `BTreeMap`
    Map,
}

impl CollectionKind {
    pub fn of(ty: &ResolvedType) -> Option<CollectionKind> {
        let kind = match ty.simple_name() {
            "Box" if ty.args.first().is_some_and(ResolvedType::is_slice) => CollectionKind::Array,
            "Vec" | "VecDeque" | "LinkedList" => CollectionKind::List,
            "HashSet" | "BTreeSet" => CollectionKind::Set,
            "HashMap" | "BTreeMap" => CollectionKind::Map,
            _ => return None,
        };
        Some(kind)
    }
}

const CONTAINER_NAMES: &[&str] = &["BinaryHeap", "IndexMap", "IndexSet", "SmallVec", "ArrayVec"];

/// Whether a type looks like a container outside the supported kinds.
pub fn is_container_like(ty: &ResolvedType) -> bool {
    ty.is_slice()
        || ty.path.starts_with('[')
        || ty.path.starts_with("collections::")
        || ty.path.contains("::collections::")
        || CONTAINER_NAMES.contains(&ty.simple_name())
}

// ============================================================================
// Descriptors
// ============================================================================

/// One case of a sealed type as seen by the value generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SealedEntry {
    pub name: String,
    /// Unit variant.
    pub is_singleton: bool,
    /// Tuple variant wrapping a fixture struct.
    pub is_fixture: bool,
    /// Factory of the wrapped fixture, when `is_fixture`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<FactoryRef>,
}

/// A classified fixture field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum ParameterDescriptor {
    Primitive {
        name: String,
        ty: ResolvedType,
        kind: PrimitiveKind,
    },
    KnownType {
        name: String,
        ty: ResolvedType,
        kind: KnownTypeKind,
    },
    Fixture {
        name: String,
        ty: ResolvedType,
        factory: FactoryRef,
    },
    Enum {
        name: String,
        ty: ResolvedType,
        entries: Vec<String>,
    },
    Sealed {
        name: String,
        ty: ResolvedType,
        entries: Vec<SealedEntry>,
    },
    Collection {
        name: String,
        ty: ResolvedType,
        kind: CollectionKind,
        element_type_args: Vec<ResolvedType>,
    },
    AdapterSupplied {
        name: String,
        ty: ResolvedType,
    },
}

impl ParameterDescriptor {
    /// Field name.
    pub fn name(&self) -> &str {
        match self {
            ParameterDescriptor::Primitive { name, .. }
            | ParameterDescriptor::KnownType { name, .. }
            | ParameterDescriptor::Fixture { name, .. }
            | ParameterDescriptor::Enum { name, .. }
            | ParameterDescriptor::Sealed { name, .. }
            | ParameterDescriptor::Collection { name, .. }
            | ParameterDescriptor::AdapterSupplied { name, .. } => name,
        }
    }

    /// Declared field type.
    pub fn ty(&self) -> &ResolvedType {
        match self {
            ParameterDescriptor::Primitive { ty, .. }
            | ParameterDescriptor::KnownType { ty, .. }
            | ParameterDescriptor::Fixture { ty, .. }
            | ParameterDescriptor::Enum { ty, .. }
            | ParameterDescriptor::Sealed { ty, .. }
            | ParameterDescriptor::Collection { ty, .. }
            | ParameterDescriptor::AdapterSupplied { ty, .. } => ty,
        }
    }

    /// Variant tag, matching the serialized `tag` field.
    pub fn tag(&self) -> &'static str {
        match self {
            ParameterDescriptor::Primitive { .. } => "primitive",
            ParameterDescriptor::KnownType { .. } => "known_type",
            ParameterDescriptor::Fixture { .. } => "fixture",
            ParameterDescriptor::Enum { .. } => "enum",
            ParameterDescriptor::Sealed { .. } => "sealed",
            ParameterDescriptor::Collection { .. } => "collection",
            ParameterDescriptor::AdapterSupplied { .. } => "adapter_supplied",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
