//! Instance state of a non-persistent seek bar preference

use serde::{Deserialize, Serialize};
use storage::parcel::{self, Parcel, Parcelable, ParcelableCreator};

/// Snapshot of a preference's value and bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    /// Committed value
    pub value: i32,
    /// Lower bound
    pub min: i32,
    /// Upper bound
    pub max: i32,
}

impl SavedState {
    /// Read a snapshot written by [`Parcelable::write_to_parcel`]
    pub fn read_from_parcel(parcel: &mut Parcel) -> parcel::Result<Self> {
        Ok(Self {
            value: parcel.read_i32()?,
            min: parcel.read_i32()?,
            max: parcel.read_i32()?,
        })
    }

    /// Factory rebuilding snapshots from parcels
    pub fn creator() -> ParcelableCreator<SavedState> {
        parcel::parcelable_creator(Self::read_from_parcel)
    }
}

impl Parcelable for SavedState {
    fn write_to_parcel(&self, parcel: &mut Parcel) {
        parcel.write_i32(self.value);
        parcel.write_i32(self.min);
        parcel.write_i32(self.max);
    }
}
