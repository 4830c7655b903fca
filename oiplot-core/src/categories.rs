use crate::error::CoreError;
use crate::palette::{category_color, Rgba};
use crate::range::{Range, RangeTracker};
use crate::table::DataTable;
use plotdef::ColorMapping;
use std::cmp::Ordering;

/// Plot-wide category lists, assigned once per refresh before any table is projected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Categories {
    pub baselines: Vec<String>,
    pub configurations: Vec<String>,
    pub wavelength_range: Option<Range>,
}

impl Categories {
    /// Collects distinct baseline and configuration names and the overall wavelength range.
    pub fn collect(tables: &[&dyn DataTable]) -> Self {
        let mut wavelengths = RangeTracker::default();
        for table in tables {
            if let Some(range) = table.wavelength_range() {
                wavelengths.add_range(&range);
            }
        }
        Self {
            baselines: distinct_names(tables.iter().flat_map(|t| t.baseline_names().iter())),
            configurations: distinct_names(
                tables.iter().flat_map(|t| t.configuration_names().iter()),
            ),
            wavelength_range: wavelengths.range(),
        }
    }

    /// Ordered names the mapping colours by; empty for wavelength mappings.
    pub fn names(&self, mapping: ColorMapping) -> &[String] {
        match mapping {
            ColorMapping::StationIndex => &self.baselines,
            ColorMapping::Configuration => &self.configurations,
            ColorMapping::WavelengthRange | ColorMapping::ObservationDate => &[],
        }
    }

    pub fn position(&self, mapping: ColorMapping, label: &str) -> Option<usize> {
        self.names(mapping).iter().position(|name| name == label)
    }

    /// Palette colour of `label`; a label absent from the plot-wide list is an error.
    pub fn color(&self, mapping: ColorMapping, label: &str) -> Result<Rgba, CoreError> {
        self.position(mapping, label)
            .map(category_color)
            .ok_or_else(|| CoreError::MissingCategory {
                mapping,
                label: label.to_string(),
            })
    }
}

/// Station names order: shorter first, then lexical.
pub fn compare_station_names(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

pub fn distinct_names<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = names.into_iter().cloned().collect();
    out.sort_by(|a, b| compare_station_names(a, b));
    out.dedup();
    out
}

/// Rounds to 3 decimal places.
pub fn trim3(value: f64) -> f64 {
    (value * 1e3).round() / 1e3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_sort_by_length_then_lexically() {
        let names = ["K0-G1-A0", "D0-H0", "A0-B1", "A0-B1", "G1-K0"].map(String::from);
        assert_eq!(
            distinct_names(names.iter()),
            vec!["A0-B1", "D0-H0", "G1-K0", "K0-G1-A0"]
        );
    }

    #[test]
    fn missing_label_is_an_error() {
        let categories = Categories {
            baselines: vec!["A0-B1".to_string()],
            ..Categories::default()
        };
        assert_eq!(
            categories.color(ColorMapping::StationIndex, "A0-B1").ok(),
            Some(category_color(0))
        );
        assert!(matches!(
            categories.color(ColorMapping::StationIndex, "C1-D2"),
            Err(CoreError::MissingCategory { label, .. }) if label == "C1-D2"
        ));
        assert!(categories
            .color(ColorMapping::Configuration, "A0-B1")
            .is_err());
    }

    #[test]
    fn trim3_rounds() {
        assert_eq!(trim3(1.23456), 1.235);
        assert_eq!(trim3(-0.0004), 0.0);
    }
}
