//! Facet schema: the canonical set of recognized filter dimensions.
//!
//! Pure data and type definitions. The declaration tables at the bottom
//! drive query building and chip derivation; the order of `RANGE_PAIRS`
//! and the chip facet lists is a presentation contract, not incidental.

use std::fmt;

/// Value shape of a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    /// Free-form string value; empty means inactive (or unbounded, for
    /// the `min_*`/`max_*` range facets).
    Text,
    /// Boolean toggle.
    Toggle,
}

/// One independently filterable dimension of the photo search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    // Scalar facets
    Tag,
    Search,
    Camera,
    Lens,
    CompositionPattern,
    Type,
    PersonId,
    // Range facets, declared as min/max pairs
    MinScore,
    MaxScore,
    MinScoreTechnical,
    MaxScoreTechnical,
    MinScoreAesthetic,
    MaxScoreAesthetic,
    MinSharpness,
    MaxSharpness,
    MinExposure,
    MaxExposure,
    MinContrast,
    MaxContrast,
    MinBrightness,
    MaxBrightness,
    MinSaturation,
    MaxSaturation,
    MinNoise,
    MaxNoise,
    MinDynamicRange,
    MaxDynamicRange,
    MinCompositionScore,
    MaxCompositionScore,
    MinBlur,
    MaxBlur,
    MinFaceCount,
    MaxFaceCount,
    MinFaceQuality,
    MaxFaceQuality,
    MinEyeSharpness,
    MaxEyeSharpness,
    MinSmile,
    MaxSmile,
    MinIso,
    MaxIso,
    MinAperture,
    MaxAperture,
    MinFocalLength,
    MaxFocalLength,
    MinShutterSpeed,
    MaxShutterSpeed,
    MinMegapixels,
    MaxMegapixels,
    MinWidth,
    MaxWidth,
    MinHeight,
    MaxHeight,
    MinRating,
    MaxRating,
    MinFileSize,
    MaxFileSize,
    MinDate,
    MaxDate,
    // Sort facets
    Sort,
    SortDirection,
    // Toggles
    HideDetails,
    HideBlinks,
    HideBursts,
    HideDuplicates,
    HideRejected,
    FavoritesOnly,
    IsMonochrome,
}

impl Facet {
    /// Wire name of the facet, as the listing API expects it.
    pub fn name(self) -> &'static str {
        match self {
            Facet::Tag => "tag",
            Facet::Search => "search",
            Facet::Camera => "camera",
            Facet::Lens => "lens",
            Facet::CompositionPattern => "composition_pattern",
            Facet::Type => "type",
            Facet::PersonId => "person_id",
            Facet::MinScore => "min_score",
            Facet::MaxScore => "max_score",
            Facet::MinScoreTechnical => "min_score_technical",
            Facet::MaxScoreTechnical => "max_score_technical",
            Facet::MinScoreAesthetic => "min_score_aesthetic",
            Facet::MaxScoreAesthetic => "max_score_aesthetic",
            Facet::MinSharpness => "min_sharpness",
            Facet::MaxSharpness => "max_sharpness",
            Facet::MinExposure => "min_exposure",
            Facet::MaxExposure => "max_exposure",
            Facet::MinContrast => "min_contrast",
            Facet::MaxContrast => "max_contrast",
            Facet::MinBrightness => "min_brightness",
            Facet::MaxBrightness => "max_brightness",
            Facet::MinSaturation => "min_saturation",
            Facet::MaxSaturation => "max_saturation",
            Facet::MinNoise => "min_noise",
            Facet::MaxNoise => "max_noise",
            Facet::MinDynamicRange => "min_dynamic_range",
            Facet::MaxDynamicRange => "max_dynamic_range",
            Facet::MinCompositionScore => "min_composition_score",
            Facet::MaxCompositionScore => "max_composition_score",
            Facet::MinBlur => "min_blur",
            Facet::MaxBlur => "max_blur",
            Facet::MinFaceCount => "min_face_count",
            Facet::MaxFaceCount => "max_face_count",
            Facet::MinFaceQuality => "min_face_quality",
            Facet::MaxFaceQuality => "max_face_quality",
            Facet::MinEyeSharpness => "min_eye_sharpness",
            Facet::MaxEyeSharpness => "max_eye_sharpness",
            Facet::MinSmile => "min_smile",
            Facet::MaxSmile => "max_smile",
            Facet::MinIso => "min_iso",
            Facet::MaxIso => "max_iso",
            Facet::MinAperture => "min_aperture",
            Facet::MaxAperture => "max_aperture",
            Facet::MinFocalLength => "min_focal_length",
            Facet::MaxFocalLength => "max_focal_length",
            Facet::MinShutterSpeed => "min_shutter_speed",
            Facet::MaxShutterSpeed => "max_shutter_speed",
            Facet::MinMegapixels => "min_megapixels",
            Facet::MaxMegapixels => "max_megapixels",
            Facet::MinWidth => "min_width",
            Facet::MaxWidth => "max_width",
            Facet::MinHeight => "min_height",
            Facet::MaxHeight => "max_height",
            Facet::MinRating => "min_rating",
            Facet::MaxRating => "max_rating",
            Facet::MinFileSize => "min_file_size",
            Facet::MaxFileSize => "max_file_size",
            Facet::MinDate => "min_date",
            Facet::MaxDate => "max_date",
            Facet::Sort => "sort",
            Facet::SortDirection => "sort_direction",
            Facet::HideDetails => "hide_details",
            Facet::HideBlinks => "hide_blinks",
            Facet::HideBursts => "hide_bursts",
            Facet::HideDuplicates => "hide_duplicates",
            Facet::HideRejected => "hide_rejected",
            Facet::FavoritesOnly => "favorites_only",
            Facet::IsMonochrome => "is_monochrome",
        }
    }

    pub fn kind(self) -> FacetKind {
        match self {
            Facet::HideDetails
            | Facet::HideBlinks
            | Facet::HideBursts
            | Facet::HideDuplicates
            | Facet::HideRejected
            | Facet::FavoritesOnly
            | Facet::IsMonochrome => FacetKind::Toggle,
            _ => FacetKind::Text,
        }
    }

    /// Sort facets reorder the existing result set; they never reset
    /// paging.
    pub fn is_sort(self) -> bool {
        matches!(self, Facet::Sort | Facet::SortDirection)
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A min/max range pair presented, and cleared, as a single unit.
#[derive(Debug, Clone, Copy)]
pub struct RangePair {
    pub min: Facet,
    pub max: Facet,
    pub label_key: &'static str,
}

/// Scalar facets that emit one chip each while non-empty, with their
/// display label keys.
pub const SCALAR_CHIP_FACETS: &[(Facet, &str)] = &[
    (Facet::Tag, "filter.tag"),
    (Facet::Search, "filter.search"),
    (Facet::Camera, "filter.camera"),
    (Facet::Lens, "filter.lens"),
    (Facet::CompositionPattern, "filter.composition_pattern"),
    (Facet::Type, "filter.type"),
];

/// Toggle facets that emit a chip while switched on.
pub const TOGGLE_CHIP_FACETS: &[(Facet, &str)] = &[
    (Facet::FavoritesOnly, "filter.favorites_only"),
    (Facet::IsMonochrome, "filter.is_monochrome"),
];

/// Default-on toggles. The server must always see these, switched on or
/// off, because default-on is itself meaningful to it.
pub const HIDE_FACETS: &[Facet] = &[
    Facet::HideDetails,
    Facet::HideBlinks,
    Facet::HideBursts,
    Facet::HideDuplicates,
    Facet::HideRejected,
];

/// Every range pair, in chip emission order. The date range comes last.
pub const RANGE_PAIRS: &[RangePair] = &[
    RangePair {
        min: Facet::MinScore,
        max: Facet::MaxScore,
        label_key: "filter.score",
    },
    RangePair {
        min: Facet::MinScoreTechnical,
        max: Facet::MaxScoreTechnical,
        label_key: "filter.score_technical",
    },
    RangePair {
        min: Facet::MinScoreAesthetic,
        max: Facet::MaxScoreAesthetic,
        label_key: "filter.score_aesthetic",
    },
    RangePair {
        min: Facet::MinSharpness,
        max: Facet::MaxSharpness,
        label_key: "filter.sharpness",
    },
    RangePair {
        min: Facet::MinExposure,
        max: Facet::MaxExposure,
        label_key: "filter.exposure",
    },
    RangePair {
        min: Facet::MinContrast,
        max: Facet::MaxContrast,
        label_key: "filter.contrast",
    },
    RangePair {
        min: Facet::MinBrightness,
        max: Facet::MaxBrightness,
        label_key: "filter.brightness",
    },
    RangePair {
        min: Facet::MinSaturation,
        max: Facet::MaxSaturation,
        label_key: "filter.saturation",
    },
    RangePair {
        min: Facet::MinNoise,
        max: Facet::MaxNoise,
        label_key: "filter.noise",
    },
    RangePair {
        min: Facet::MinDynamicRange,
        max: Facet::MaxDynamicRange,
        label_key: "filter.dynamic_range",
    },
    RangePair {
        min: Facet::MinCompositionScore,
        max: Facet::MaxCompositionScore,
        label_key: "filter.composition_score",
    },
    RangePair {
        min: Facet::MinBlur,
        max: Facet::MaxBlur,
        label_key: "filter.blur",
    },
    RangePair {
        min: Facet::MinFaceCount,
        max: Facet::MaxFaceCount,
        label_key: "filter.face_count",
    },
    RangePair {
        min: Facet::MinFaceQuality,
        max: Facet::MaxFaceQuality,
        label_key: "filter.face_quality",
    },
    RangePair {
        min: Facet::MinEyeSharpness,
        max: Facet::MaxEyeSharpness,
        label_key: "filter.eye_sharpness",
    },
    RangePair {
        min: Facet::MinSmile,
        max: Facet::MaxSmile,
        label_key: "filter.smile",
    },
    RangePair {
        min: Facet::MinIso,
        max: Facet::MaxIso,
        label_key: "filter.iso",
    },
    RangePair {
        min: Facet::MinAperture,
        max: Facet::MaxAperture,
        label_key: "filter.aperture",
    },
    RangePair {
        min: Facet::MinFocalLength,
        max: Facet::MaxFocalLength,
        label_key: "filter.focal_length",
    },
    RangePair {
        min: Facet::MinShutterSpeed,
        max: Facet::MaxShutterSpeed,
        label_key: "filter.shutter_speed",
    },
    RangePair {
        min: Facet::MinMegapixels,
        max: Facet::MaxMegapixels,
        label_key: "filter.megapixels",
    },
    RangePair {
        min: Facet::MinWidth,
        max: Facet::MaxWidth,
        label_key: "filter.width",
    },
    RangePair {
        min: Facet::MinHeight,
        max: Facet::MaxHeight,
        label_key: "filter.height",
    },
    RangePair {
        min: Facet::MinRating,
        max: Facet::MaxRating,
        label_key: "filter.rating",
    },
    RangePair {
        min: Facet::MinFileSize,
        max: Facet::MaxFileSize,
        label_key: "filter.file_size",
    },
    RangePair {
        min: Facet::MinDate,
        max: Facet::MaxDate,
        label_key: "filter.date",
    },
];

/// Every text facet in declaration order, for query building and
/// active-facet counting.
pub const TEXT_FACETS: &[Facet] = &[
    Facet::Tag,
    Facet::Search,
    Facet::Camera,
    Facet::Lens,
    Facet::CompositionPattern,
    Facet::Type,
    Facet::PersonId,
    Facet::MinScore,
    Facet::MaxScore,
    Facet::MinScoreTechnical,
    Facet::MaxScoreTechnical,
    Facet::MinScoreAesthetic,
    Facet::MaxScoreAesthetic,
    Facet::MinSharpness,
    Facet::MaxSharpness,
    Facet::MinExposure,
    Facet::MaxExposure,
    Facet::MinContrast,
    Facet::MaxContrast,
    Facet::MinBrightness,
    Facet::MaxBrightness,
    Facet::MinSaturation,
    Facet::MaxSaturation,
    Facet::MinNoise,
    Facet::MaxNoise,
    Facet::MinDynamicRange,
    Facet::MaxDynamicRange,
    Facet::MinCompositionScore,
    Facet::MaxCompositionScore,
    Facet::MinBlur,
    Facet::MaxBlur,
    Facet::MinFaceCount,
    Facet::MaxFaceCount,
    Facet::MinFaceQuality,
    Facet::MaxFaceQuality,
    Facet::MinEyeSharpness,
    Facet::MaxEyeSharpness,
    Facet::MinSmile,
    Facet::MaxSmile,
    Facet::MinIso,
    Facet::MaxIso,
    Facet::MinAperture,
    Facet::MaxAperture,
    Facet::MinFocalLength,
    Facet::MaxFocalLength,
    Facet::MinShutterSpeed,
    Facet::MaxShutterSpeed,
    Facet::MinMegapixels,
    Facet::MaxMegapixels,
    Facet::MinWidth,
    Facet::MaxWidth,
    Facet::MinHeight,
    Facet::MaxHeight,
    Facet::MinRating,
    Facet::MaxRating,
    Facet::MinFileSize,
    Facet::MaxFileSize,
    Facet::MinDate,
    Facet::MaxDate,
    Facet::Sort,
    Facet::SortDirection,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_text_facets_unique_and_text_kind() {
        let mut seen = HashSet::new();
        for &facet in TEXT_FACETS {
            assert_eq!(facet.kind(), FacetKind::Text);
            assert!(seen.insert(facet.name()), "duplicate facet {facet}");
        }
        assert_eq!(TEXT_FACETS.len(), 61);
    }

    #[test]
    fn test_range_pairs_share_a_base_name() {
        for pair in RANGE_PAIRS {
            assert!(pair.min.name().starts_with("min_"));
            assert!(pair.max.name().starts_with("max_"));
            assert_eq!(&pair.min.name()[4..], &pair.max.name()[4..]);
        }
        assert_eq!(RANGE_PAIRS.len(), 26);
    }

    #[test]
    fn test_toggle_tables_are_toggles() {
        for &facet in HIDE_FACETS {
            assert_eq!(facet.kind(), FacetKind::Toggle);
        }
        for &(facet, _) in TOGGLE_CHIP_FACETS {
            assert_eq!(facet.kind(), FacetKind::Toggle);
        }
    }

    #[test]
    fn test_sort_facets_never_reset_paging() {
        assert!(Facet::Sort.is_sort());
        assert!(Facet::SortDirection.is_sort());
        assert!(!Facet::Tag.is_sort());
        assert!(!Facet::MinScore.is_sort());
    }
}
