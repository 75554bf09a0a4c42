//! Filter state: the flat record of every facet value, and the store
//! that owns it.
//!
//! All mutation goes through [`FilterStore`]. Every operation replaces
//! the whole record (copy-on-write) and publishes the new snapshot, so
//! observers never see a partially applied update.

use std::sync::mpsc;
use std::sync::Arc;

use tracing::warn;

use super::schema::{Facet, FacetKind, HIDE_FACETS, TEXT_FACETS, TOGGLE_CHIP_FACETS};

/// Result window size used when no configuration overrides it.
pub const DEFAULT_PER_PAGE: u32 = 60;

/// A value to write through the store. Kind must match the facet;
/// mismatches are logged and ignored rather than corrupting state.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for FacetValue {
    fn from(value: &str) -> Self {
        FacetValue::Text(value.to_string())
    }
}

impl From<String> for FacetValue {
    fn from(value: String) -> Self {
        FacetValue::Text(value)
    }
}

impl From<bool> for FacetValue {
    fn from(value: bool) -> Self {
        FacetValue::Flag(value)
    }
}

/// Current value of every facet. Strings are stored verbatim; a
/// non-numeric value in a range facet is the server's problem, not ours.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    // Scalar facets
    pub tag: String,
    pub search: String,
    pub camera: String,
    pub lens: String,
    pub composition_pattern: String,
    pub photo_type: String,
    pub person_id: String,
    // Range facets; empty string = unbounded on that side
    pub min_score: String,
    pub max_score: String,
    pub min_score_technical: String,
    pub max_score_technical: String,
    pub min_score_aesthetic: String,
    pub max_score_aesthetic: String,
    pub min_sharpness: String,
    pub max_sharpness: String,
    pub min_exposure: String,
    pub max_exposure: String,
    pub min_contrast: String,
    pub max_contrast: String,
    pub min_brightness: String,
    pub max_brightness: String,
    pub min_saturation: String,
    pub max_saturation: String,
    pub min_noise: String,
    pub max_noise: String,
    pub min_dynamic_range: String,
    pub max_dynamic_range: String,
    pub min_composition_score: String,
    pub max_composition_score: String,
    pub min_blur: String,
    pub max_blur: String,
    pub min_face_count: String,
    pub max_face_count: String,
    pub min_face_quality: String,
    pub max_face_quality: String,
    pub min_eye_sharpness: String,
    pub max_eye_sharpness: String,
    pub min_smile: String,
    pub max_smile: String,
    pub min_iso: String,
    pub max_iso: String,
    pub min_aperture: String,
    pub max_aperture: String,
    pub min_focal_length: String,
    pub max_focal_length: String,
    pub min_shutter_speed: String,
    pub max_shutter_speed: String,
    pub min_megapixels: String,
    pub max_megapixels: String,
    pub min_width: String,
    pub max_width: String,
    pub min_height: String,
    pub max_height: String,
    pub min_rating: String,
    pub max_rating: String,
    pub min_file_size: String,
    pub max_file_size: String,
    pub min_date: String,
    pub max_date: String,
    // Sort facets
    pub sort: String,
    pub sort_direction: String,
    // Toggles; the hide_* group defaults on
    pub hide_details: bool,
    pub hide_blinks: bool,
    pub hide_bursts: bool,
    pub hide_duplicates: bool,
    pub hide_rejected: bool,
    pub favorites_only: bool,
    pub is_monochrome: bool,
    // Result window
    pub page: u32,
    pub per_page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            tag: String::new(),
            search: String::new(),
            camera: String::new(),
            lens: String::new(),
            composition_pattern: String::new(),
            photo_type: String::new(),
            person_id: String::new(),
            min_score: String::new(),
            max_score: String::new(),
            min_score_technical: String::new(),
            max_score_technical: String::new(),
            min_score_aesthetic: String::new(),
            max_score_aesthetic: String::new(),
            min_sharpness: String::new(),
            max_sharpness: String::new(),
            min_exposure: String::new(),
            max_exposure: String::new(),
            min_contrast: String::new(),
            max_contrast: String::new(),
            min_brightness: String::new(),
            max_brightness: String::new(),
            min_saturation: String::new(),
            max_saturation: String::new(),
            min_noise: String::new(),
            max_noise: String::new(),
            min_dynamic_range: String::new(),
            max_dynamic_range: String::new(),
            min_composition_score: String::new(),
            max_composition_score: String::new(),
            min_blur: String::new(),
            max_blur: String::new(),
            min_face_count: String::new(),
            max_face_count: String::new(),
            min_face_quality: String::new(),
            max_face_quality: String::new(),
            min_eye_sharpness: String::new(),
            max_eye_sharpness: String::new(),
            min_smile: String::new(),
            max_smile: String::new(),
            min_iso: String::new(),
            max_iso: String::new(),
            min_aperture: String::new(),
            max_aperture: String::new(),
            min_focal_length: String::new(),
            max_focal_length: String::new(),
            min_shutter_speed: String::new(),
            max_shutter_speed: String::new(),
            min_megapixels: String::new(),
            max_megapixels: String::new(),
            min_width: String::new(),
            max_width: String::new(),
            min_height: String::new(),
            max_height: String::new(),
            min_rating: String::new(),
            max_rating: String::new(),
            min_file_size: String::new(),
            max_file_size: String::new(),
            min_date: String::new(),
            max_date: String::new(),
            sort: "score".to_string(),
            sort_direction: "DESC".to_string(),
            hide_details: true,
            hide_blinks: true,
            hide_bursts: true,
            hide_duplicates: true,
            hide_rejected: true,
            favorites_only: false,
            is_monochrome: false,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl FilterState {
    /// Text value of a facet. Toggles read as empty.
    pub fn text(&self, facet: Facet) -> &str {
        match facet {
            Facet::Tag => &self.tag,
            Facet::Search => &self.search,
            Facet::Camera => &self.camera,
            Facet::Lens => &self.lens,
            Facet::CompositionPattern => &self.composition_pattern,
            Facet::Type => &self.photo_type,
            Facet::PersonId => &self.person_id,
            Facet::MinScore => &self.min_score,
            Facet::MaxScore => &self.max_score,
            Facet::MinScoreTechnical => &self.min_score_technical,
            Facet::MaxScoreTechnical => &self.max_score_technical,
            Facet::MinScoreAesthetic => &self.min_score_aesthetic,
            Facet::MaxScoreAesthetic => &self.max_score_aesthetic,
            Facet::MinSharpness => &self.min_sharpness,
            Facet::MaxSharpness => &self.max_sharpness,
            Facet::MinExposure => &self.min_exposure,
            Facet::MaxExposure => &self.max_exposure,
            Facet::MinContrast => &self.min_contrast,
            Facet::MaxContrast => &self.max_contrast,
            Facet::MinBrightness => &self.min_brightness,
            Facet::MaxBrightness => &self.max_brightness,
            Facet::MinSaturation => &self.min_saturation,
            Facet::MaxSaturation => &self.max_saturation,
            Facet::MinNoise => &self.min_noise,
            Facet::MaxNoise => &self.max_noise,
            Facet::MinDynamicRange => &self.min_dynamic_range,
            Facet::MaxDynamicRange => &self.max_dynamic_range,
            Facet::MinCompositionScore => &self.min_composition_score,
            Facet::MaxCompositionScore => &self.max_composition_score,
            Facet::MinBlur => &self.min_blur,
            Facet::MaxBlur => &self.max_blur,
            Facet::MinFaceCount => &self.min_face_count,
            Facet::MaxFaceCount => &self.max_face_count,
            Facet::MinFaceQuality => &self.min_face_quality,
            Facet::MaxFaceQuality => &self.max_face_quality,
            Facet::MinEyeSharpness => &self.min_eye_sharpness,
            Facet::MaxEyeSharpness => &self.max_eye_sharpness,
            Facet::MinSmile => &self.min_smile,
            Facet::MaxSmile => &self.max_smile,
            Facet::MinIso => &self.min_iso,
            Facet::MaxIso => &self.max_iso,
            Facet::MinAperture => &self.min_aperture,
            Facet::MaxAperture => &self.max_aperture,
            Facet::MinFocalLength => &self.min_focal_length,
            Facet::MaxFocalLength => &self.max_focal_length,
            Facet::MinShutterSpeed => &self.min_shutter_speed,
            Facet::MaxShutterSpeed => &self.max_shutter_speed,
            Facet::MinMegapixels => &self.min_megapixels,
            Facet::MaxMegapixels => &self.max_megapixels,
            Facet::MinWidth => &self.min_width,
            Facet::MaxWidth => &self.max_width,
            Facet::MinHeight => &self.min_height,
            Facet::MaxHeight => &self.max_height,
            Facet::MinRating => &self.min_rating,
            Facet::MaxRating => &self.max_rating,
            Facet::MinFileSize => &self.min_file_size,
            Facet::MaxFileSize => &self.max_file_size,
            Facet::MinDate => &self.min_date,
            Facet::MaxDate => &self.max_date,
            Facet::Sort => &self.sort,
            Facet::SortDirection => &self.sort_direction,
            Facet::HideDetails
            | Facet::HideBlinks
            | Facet::HideBursts
            | Facet::HideDuplicates
            | Facet::HideRejected
            | Facet::FavoritesOnly
            | Facet::IsMonochrome => "",
        }
    }

    /// Toggle value of a facet. Text facets read as off.
    pub fn flag(&self, facet: Facet) -> bool {
        match facet {
            Facet::HideDetails => self.hide_details,
            Facet::HideBlinks => self.hide_blinks,
            Facet::HideBursts => self.hide_bursts,
            Facet::HideDuplicates => self.hide_duplicates,
            Facet::HideRejected => self.hide_rejected,
            Facet::FavoritesOnly => self.favorites_only,
            Facet::IsMonochrome => self.is_monochrome,
            _ => false,
        }
    }

    fn text_mut(&mut self, facet: Facet) -> Option<&mut String> {
        match facet {
            Facet::Tag => Some(&mut self.tag),
            Facet::Search => Some(&mut self.search),
            Facet::Camera => Some(&mut self.camera),
            Facet::Lens => Some(&mut self.lens),
            Facet::CompositionPattern => Some(&mut self.composition_pattern),
            Facet::Type => Some(&mut self.photo_type),
            Facet::PersonId => Some(&mut self.person_id),
            Facet::MinScore => Some(&mut self.min_score),
            Facet::MaxScore => Some(&mut self.max_score),
            Facet::MinScoreTechnical => Some(&mut self.min_score_technical),
            Facet::MaxScoreTechnical => Some(&mut self.max_score_technical),
            Facet::MinScoreAesthetic => Some(&mut self.min_score_aesthetic),
            Facet::MaxScoreAesthetic => Some(&mut self.max_score_aesthetic),
            Facet::MinSharpness => Some(&mut self.min_sharpness),
            Facet::MaxSharpness => Some(&mut self.max_sharpness),
            Facet::MinExposure => Some(&mut self.min_exposure),
            Facet::MaxExposure => Some(&mut self.max_exposure),
            Facet::MinContrast => Some(&mut self.min_contrast),
            Facet::MaxContrast => Some(&mut self.max_contrast),
            Facet::MinBrightness => Some(&mut self.min_brightness),
            Facet::MaxBrightness => Some(&mut self.max_brightness),
            Facet::MinSaturation => Some(&mut self.min_saturation),
            Facet::MaxSaturation => Some(&mut self.max_saturation),
            Facet::MinNoise => Some(&mut self.min_noise),
            Facet::MaxNoise => Some(&mut self.max_noise),
            Facet::MinDynamicRange => Some(&mut self.min_dynamic_range),
            Facet::MaxDynamicRange => Some(&mut self.max_dynamic_range),
            Facet::MinCompositionScore => Some(&mut self.min_composition_score),
            Facet::MaxCompositionScore => Some(&mut self.max_composition_score),
            Facet::MinBlur => Some(&mut self.min_blur),
            Facet::MaxBlur => Some(&mut self.max_blur),
            Facet::MinFaceCount => Some(&mut self.min_face_count),
            Facet::MaxFaceCount => Some(&mut self.max_face_count),
            Facet::MinFaceQuality => Some(&mut self.min_face_quality),
            Facet::MaxFaceQuality => Some(&mut self.max_face_quality),
            Facet::MinEyeSharpness => Some(&mut self.min_eye_sharpness),
            Facet::MaxEyeSharpness => Some(&mut self.max_eye_sharpness),
            Facet::MinSmile => Some(&mut self.min_smile),
            Facet::MaxSmile => Some(&mut self.max_smile),
            Facet::MinIso => Some(&mut self.min_iso),
            Facet::MaxIso => Some(&mut self.max_iso),
            Facet::MinAperture => Some(&mut self.min_aperture),
            Facet::MaxAperture => Some(&mut self.max_aperture),
            Facet::MinFocalLength => Some(&mut self.min_focal_length),
            Facet::MaxFocalLength => Some(&mut self.max_focal_length),
            Facet::MinShutterSpeed => Some(&mut self.min_shutter_speed),
            Facet::MaxShutterSpeed => Some(&mut self.max_shutter_speed),
            Facet::MinMegapixels => Some(&mut self.min_megapixels),
            Facet::MaxMegapixels => Some(&mut self.max_megapixels),
            Facet::MinWidth => Some(&mut self.min_width),
            Facet::MaxWidth => Some(&mut self.max_width),
            Facet::MinHeight => Some(&mut self.min_height),
            Facet::MaxHeight => Some(&mut self.max_height),
            Facet::MinRating => Some(&mut self.min_rating),
            Facet::MaxRating => Some(&mut self.max_rating),
            Facet::MinFileSize => Some(&mut self.min_file_size),
            Facet::MaxFileSize => Some(&mut self.max_file_size),
            Facet::MinDate => Some(&mut self.min_date),
            Facet::MaxDate => Some(&mut self.max_date),
            Facet::Sort => Some(&mut self.sort),
            Facet::SortDirection => Some(&mut self.sort_direction),
            _ => None,
        }
    }

    fn flag_mut(&mut self, facet: Facet) -> Option<&mut bool> {
        match facet {
            Facet::HideDetails => Some(&mut self.hide_details),
            Facet::HideBlinks => Some(&mut self.hide_blinks),
            Facet::HideBursts => Some(&mut self.hide_bursts),
            Facet::HideDuplicates => Some(&mut self.hide_duplicates),
            Facet::HideRejected => Some(&mut self.hide_rejected),
            Facet::FavoritesOnly => Some(&mut self.favorites_only),
            Facet::IsMonochrome => Some(&mut self.is_monochrome),
            _ => None,
        }
    }

    fn apply(&mut self, facet: Facet, value: &FacetValue) {
        match (facet.kind(), value) {
            (FacetKind::Text, FacetValue::Text(text)) => {
                if let Some(slot) = self.text_mut(facet) {
                    *slot = text.clone();
                }
            }
            (FacetKind::Toggle, FacetValue::Flag(on)) => {
                if let Some(slot) = self.flag_mut(facet) {
                    *slot = *on;
                }
            }
            (kind, value) => {
                warn!(facet = %facet, ?kind, ?value, "facet value kind mismatch, ignored");
            }
        }
    }
}

/// Owns the current [`FilterState`] and publishes a new immutable
/// snapshot on every mutation.
pub struct FilterStore {
    state: Arc<FilterState>,
    subscribers: Vec<mpsc::Sender<Arc<FilterState>>>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::with_per_page(DEFAULT_PER_PAGE)
    }

    pub fn with_per_page(per_page: u32) -> Self {
        let state = FilterState {
            per_page,
            ..FilterState::default()
        };
        Self {
            state: Arc::new(state),
            subscribers: Vec::new(),
        }
    }

    /// Current immutable snapshot.
    pub fn get(&self) -> Arc<FilterState> {
        Arc::clone(&self.state)
    }

    /// Receive every snapshot published after this call. Disconnected
    /// receivers are pruned on the next mutation.
    pub fn subscribe(&mut self) -> mpsc::Receiver<Arc<FilterState>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Replace a single facet. Any facet other than the sort facets
    /// resets `page` to 1.
    pub fn set_one(&mut self, facet: Facet, value: FacetValue) {
        let update = [(facet, value)];
        self.set_many(&update);
    }

    /// Replace a batch of facets in one snapshot swap. Observers never
    /// see a state where only part of the batch has been applied.
    pub fn set_many(&mut self, updates: &[(Facet, FacetValue)]) {
        if updates.is_empty() {
            return;
        }
        let mut next = (*self.state).clone();
        for (facet, value) in updates {
            next.apply(*facet, value);
        }
        if updates.iter().any(|(facet, _)| !facet.is_sort()) {
            next.page = 1;
        }
        self.commit(next);
    }

    /// Move the result window. Never resets other facets.
    pub fn set_page(&mut self, page: u32) {
        let mut next = (*self.state).clone();
        next.page = page;
        self.commit(next);
    }

    /// Changing the window size restarts paging from the first page.
    pub fn set_per_page(&mut self, per_page: u32) {
        let mut next = (*self.state).clone();
        next.per_page = per_page;
        next.page = 1;
        self.commit(next);
    }

    /// Restore the default snapshot, keeping the configured window size.
    pub fn reset(&mut self) {
        self.commit(FilterState {
            per_page: self.state.per_page,
            ..FilterState::default()
        });
    }

    /// Number of facets deviating from their inactive default, excluding
    /// the result window and the sort facets. Feeds UI affordances only.
    pub fn active_count(&self) -> usize {
        let defaults = FilterState::default();
        let mut count = 0;
        for &facet in TEXT_FACETS {
            if facet.is_sort() {
                continue;
            }
            if self.state.text(facet) != defaults.text(facet) {
                count += 1;
            }
        }
        for &facet in HIDE_FACETS {
            if self.state.flag(facet) != defaults.flag(facet) {
                count += 1;
            }
        }
        for &(facet, _) in TOGGLE_CHIP_FACETS {
            if self.state.flag(facet) != defaults.flag(facet) {
                count += 1;
            }
        }
        count
    }

    fn commit(&mut self, next: FilterState) {
        self.state = Arc::new(next);
        self.subscribers
            .retain(|tx| tx.send(Arc::clone(&self.state)).is_ok());
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}
