use crate::geo::LatLng;
use crate::labels::place::PlacedLabel;
use thiserror::Error;

/// What the renderer needs to draw one label
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementInstruction {
    pub id: String,
    pub text: String,
    pub anchor: LatLng,
    /// Stacking hint, proportional to population
    pub z_index: i32,
    pub in_viewport: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum LabelError {
    #[error("label text is blank")]
    BlankText,
    #[error("anchor {0:?} is not a valid position")]
    InvalidAnchor(LatLng),
    #[error("population {0} overflows the z-index range")]
    ZIndexOverflow(u64),
}

impl TryFrom<&PlacedLabel> for PlacementInstruction {
    type Error = LabelError;

    fn try_from(label: &PlacedLabel) -> Result<Self, Self::Error> {
        let c = &label.candidate;
        let text = c.id.trim();
        if text.is_empty() {
            return Err(LabelError::BlankText);
        }
        if !c.center.is_valid() {
            return Err(LabelError::InvalidAnchor(c.center));
        }
        let z_index = i32::try_from((c.population as f64 / 1000.0).round() as i64)
            .map_err(|_| LabelError::ZIndexOverflow(c.population))?;

        Ok(Self {
            id: c.id.clone(),
            text: text.to_string(),
            anchor: c.center,
            z_index,
            in_viewport: label.in_viewport,
        })
    }
}
