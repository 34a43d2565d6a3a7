//! Flat binary containers for capturing object state
//!
//! A [`Parcel`] is written and read back in the same field order. Types
//! that can flatten themselves implement [`Parcelable`]; the reverse
//! direction is a [`ParcelableCreator`], usually built from a closure with
//! [`parcelable_creator`].

use thiserror::Error;

/// Parcel error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParcelError {
    /// Not enough bytes left for the requested read
    #[error("Parcel underflow: needed {needed} bytes at offset {offset}, {available} available")]
    Underflow {
        /// Read offset
        offset: usize,
        /// Bytes needed
        needed: usize,
        /// Bytes left
        available: usize,
    },

    /// A string field was not valid UTF-8
    #[error("Invalid UTF-8 string at offset {0}")]
    InvalidString(usize),
}

/// Result type for parcel operations
pub type Result<T> = std::result::Result<T, ParcelError>;

/// Ordered, little-endian byte container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parcel {
    data: Vec<u8>,
    position: usize,
}

impl Parcel {
    /// Create an empty parcel
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap previously marshalled bytes for reading
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Marshalled bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the parcel, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Current read offset
    pub fn data_position(&self) -> usize {
        self.position
    }

    /// Bytes left to read
    pub fn data_avail(&self) -> usize {
        self.data.len() - self.position
    }

    /// Append an `i32`
    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Append an `i64`
    pub fn write_i64(&mut self, value: i64) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a `bool` (stored as an `i32`)
    pub fn write_bool(&mut self, value: bool) {
        self.write_i32(i32::from(value));
    }

    /// Append a length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) {
        self.data.extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.data.extend_from_slice(value.as_bytes());
    }

    /// Read an `i32`
    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an `i64`
    pub fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(buf))
    }

    /// Read a `bool`
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String> {
        let len_bytes = self.take(4)?;
        let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
        let offset = self.position;
        let bytes = self.take(len as usize)?;

        String::from_utf8(bytes.to_vec()).map_err(|_| ParcelError::InvalidString(offset))
    }

    fn take(&mut self, needed: usize) -> Result<&[u8]> {
        let available = self.data_avail();
        if needed > available {
            return Err(ParcelError::Underflow { offset: self.position, needed, available });
        }

        let start = self.position;
        self.position += needed;
        Ok(&self.data[start..self.position])
    }
}

/// Types that can flatten their state into a [`Parcel`]
pub trait Parcelable {
    /// Write this object's fields, in order, to `dest`
    fn write_to_parcel(&self, dest: &mut Parcel);

    /// Bitmask of special objects contained in the marshalled form
    fn describe_contents(&self) -> i32 {
        0
    }

    /// Marshal into a fresh parcel
    fn to_parcel(&self) -> Parcel {
        let mut parcel = Parcel::new();
        self.write_to_parcel(&mut parcel);
        parcel
    }
}

type CreateFn<T> = Box<dyn Fn(&mut Parcel) -> Result<T> + Send + Sync>;

/// Rebuilds `T` values from parcels
pub struct ParcelableCreator<T> {
    create: CreateFn<T>,
}

impl<T> ParcelableCreator<T> {
    /// Read one `T` from the current position of `source`
    pub fn create_from_parcel(&self, source: &mut Parcel) -> Result<T> {
        (self.create)(source)
    }

    /// Allocate `size` empty slots
    pub fn new_array(&self, size: usize) -> Vec<Option<T>> {
        std::iter::repeat_with(|| None).take(size).collect()
    }
}

/// Build a [`ParcelableCreator`] from a reading closure
pub fn parcelable_creator<T, F>(create: F) -> ParcelableCreator<T>
where
    F: Fn(&mut Parcel) -> Result<T> + Send + Sync + 'static,
{
    ParcelableCreator { create: Box::new(create) }
}
