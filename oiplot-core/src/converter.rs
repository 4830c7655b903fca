use crate::CoreError;
use plotdef::{CONVERTER_MEGA_LAMBDA, CONVERTER_MICRO_METER, CONVERTER_REFLECT};

pub const UNIT_MEGA_LAMBDA: &str = "Mλ";
pub const UNIT_MICRO_METER: &str = "µm";

/// Stateless value transform applied before plotting.
#[derive(Debug, Clone, PartialEq)]
pub enum Converter {
    /// `y = factor * x`
    Scaling { factor: f64, unit: &'static str },
    /// `y = -x`
    Reflect,
}

pub const MEGA_LAMBDA: Converter = Converter::Scaling {
    factor: 1e-6,
    unit: UNIT_MEGA_LAMBDA,
};
pub const MICRO_METER: Converter = Converter::Scaling {
    factor: 1e6,
    unit: UNIT_MICRO_METER,
};
pub const REFLECT: Converter = Converter::Reflect;

impl Converter {
    pub fn evaluate(&self, value: f64) -> f64 {
        match self {
            Converter::Scaling { factor, .. } => factor * value,
            Converter::Reflect => -value,
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Converter::Scaling { unit, .. } => Some(unit),
            Converter::Reflect => None,
        }
    }

    /// Converts a non-negative error magnitude. Reflection leaves the spread unchanged.
    pub fn evaluate_error(&self, error: f64) -> f64 {
        match self {
            Converter::Scaling { factor, .. } => (factor * error).abs(),
            Converter::Reflect => error,
        }
    }
}

const COLUMN_CONVERTERS: [(&str, &str); 8] = [
    ("EFF_WAVE", CONVERTER_MICRO_METER),
    ("SPATIAL_FREQ", CONVERTER_MEGA_LAMBDA),
    ("UCOORD_SPATIAL", CONVERTER_MEGA_LAMBDA),
    ("VCOORD_SPATIAL", CONVERTER_MEGA_LAMBDA),
    ("U1COORD_SPATIAL", CONVERTER_MEGA_LAMBDA),
    ("V1COORD_SPATIAL", CONVERTER_MEGA_LAMBDA),
    ("U2COORD_SPATIAL", CONVERTER_MEGA_LAMBDA),
    ("V2COORD_SPATIAL", CONVERTER_MEGA_LAMBDA),
];

pub struct ConverterRegistry;

impl ConverterRegistry {
    pub fn keys() -> Vec<&'static str> {
        vec![CONVERTER_REFLECT, CONVERTER_MEGA_LAMBDA, CONVERTER_MICRO_METER]
    }

    /// Looks up a converter by key; `None` or an empty key means no conversion.
    pub fn get(key: Option<&str>) -> Result<Option<Converter>, CoreError> {
        let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        match key {
            CONVERTER_REFLECT => Ok(Some(REFLECT)),
            CONVERTER_MEGA_LAMBDA => Ok(Some(MEGA_LAMBDA)),
            CONVERTER_MICRO_METER => Ok(Some(MICRO_METER)),
            _ => Err(CoreError::UnknownConverter(key.to_string())),
        }
    }

    /// Converter key suggested for a column name.
    pub fn default_for_column(column: &str) -> Option<&'static str> {
        COLUMN_CONVERTERS
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, key)| *key)
    }
}
