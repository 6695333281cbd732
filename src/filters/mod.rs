// In: src/filters/mod.rs

//! The shuffle filter layer: reversible, seed-keyed geometric filters run over
//! the packed container so it does not look like an image of a difference.
//!
//! Filters are a closed enum. Each forward kind declares its inverse, and
//! `apply_filters` with `inverted = true` walks a forward list backwards using
//! those inverses, so forward-then-inverted on the same seed image is the
//! identity.

pub mod roll;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use self::roll::{negated, roll, shift_sequence, RollParams, HORIZONTAL, VERTICAL};
use crate::error::PatchError;
use crate::types::Image;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    #[serde(rename = "roll-h")]
    RollHorizontal,
    #[serde(rename = "roll-v")]
    RollVertical,
    #[serde(rename = "iroll-h")]
    InverseRollHorizontal,
    #[serde(rename = "iroll-v")]
    InverseRollVertical,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        Self::RollHorizontal,
        Self::RollVertical,
        Self::InverseRollHorizontal,
        Self::InverseRollVertical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::RollHorizontal => "roll-h",
            Self::RollVertical => "roll-v",
            Self::InverseRollHorizontal => "iroll-h",
            Self::InverseRollVertical => "iroll-v",
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            Self::RollHorizontal => Self::InverseRollHorizontal,
            Self::RollVertical => Self::InverseRollVertical,
            Self::InverseRollHorizontal => Self::RollHorizontal,
            Self::InverseRollVertical => Self::RollVertical,
        }
    }

    pub fn is_forward(self) -> bool {
        matches!(self, Self::RollHorizontal | Self::RollVertical)
    }

    fn params(self) -> RollParams {
        match self {
            Self::RollHorizontal | Self::InverseRollHorizontal => HORIZONTAL,
            Self::RollVertical | Self::InverseRollVertical => VERTICAL,
        }
    }

    /// Runs this single filter over `image`, keyed by `seed_image`.
    pub fn apply(self, image: &Image, seed_image: &Image) -> Result<Image, PatchError> {
        let params = self.params();
        let (height, width, _) = image.dim();
        let shifts = shift_sequence(params, (height, width), seed_image);
        let shifts = if self.is_forward() {
            shifts
        } else {
            negated(&shifts)
        };
        Image::new(roll(image.samples(), params.axis, &shifts), image.depth())
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| PatchError::UnknownFilter(s.to_string()))
    }
}

/// Applies `kinds` to `image` in order. With `inverted`, the list is reversed
/// and every kind replaced by its inverse.
///
/// # Errors
/// `UnknownFilter` if `kinds` names an inverse kind; callers always pass the
/// forward list.
pub fn apply_filters(
    image: &Image,
    seed_image: &Image,
    kinds: &[FilterKind],
    inverted: bool,
) -> Result<Image, PatchError> {
    if let Some(kind) = kinds.iter().find(|k| !k.is_forward()) {
        return Err(PatchError::UnknownFilter(format!(
            "{} is not a forward filter",
            kind
        )));
    }

    let chain: Vec<FilterKind> = if inverted {
        kinds.iter().rev().map(|k| k.inverse()).collect()
    } else {
        kinds.to_vec()
    };

    let mut filtered = image.clone();
    for kind in chain {
        log::debug!("applying filter {}", kind);
        filtered = kind.apply(&filtered, seed_image)?;
    }
    Ok(filtered)
}
