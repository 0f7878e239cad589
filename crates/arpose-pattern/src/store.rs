use crate::errors::PatternError;

/// Default template resolution, in samples per side.
pub const PATT_SIZE_DEFAULT: usize = 16;

/// Largest supported template resolution.
pub const PATT_SIZE_MAX: usize = 64;

/// Default number of slots.
pub const PATT_NUM_DEFAULT: usize = 50;

/// Minimum supported template resolution.
const PATT_SIZE_MIN: usize = 16;

/// Number of rotational variants kept per template.
const NUM_ROTATIONS: usize = 4;

/// Energy assigned to a flat template so correlation never divides by zero.
const MIN_ENERGY: f64 = 1e-7;

/// Index of an allocated slot in a [`PattStore`].
///
/// Handles stay valid until the slot is freed; they are not shared between stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PattHandle(usize);

impl PattHandle {
    /// The slot index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One rotation of a template, centred on its mean.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternVariant {
    /// Color samples, `size * size * 3`, inverted and mean-centred.
    pub color: Vec<i32>,
    /// Grayscale samples, `size * size`, derived from `color`.
    pub bw: Vec<i32>,
    /// L2 norm of `color`.
    pub energy: f64,
    /// L2 norm of `bw`.
    pub energy_bw: f64,
}

impl PatternVariant {
    fn new(pattern_size: usize) -> Self {
        let n = pattern_size * pattern_size;
        Self {
            color: vec![0; n * 3],
            bw: vec![0; n],
            energy: 0.0,
            energy_bw: 0.0,
        }
    }

    fn reset(&mut self) {
        self.color.fill(0);
        self.bw.fill(0);
        self.energy = 0.0;
        self.energy_bw = 0.0;
    }
}

#[derive(Debug, Clone)]
struct PatternSlot {
    in_use: bool,
    variants: [PatternVariant; NUM_ROTATIONS],
}

/// A fixed-capacity arena of marker templates.
///
/// Every slot is allocated up front with room for four rotations of a
/// `pattern_size x pattern_size` template. Slots are handed out with
/// [`PattStore::alloc`] and returned with [`PattStore::free`].
#[derive(Debug)]
pub struct PattStore {
    pattern_size: usize,
    slots: Vec<PatternSlot>,
    num_in_use: usize,
}

impl PattStore {
    /// Create a store of `capacity` slots for templates of `pattern_size` samples per side.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidParameter`] if `pattern_size` is outside
    /// `16..=64` or `capacity` is zero.
    ///
    /// Example:
    ///
    /// ```
    /// use arpose_pattern::PattStore;
    ///
    /// assert!(PattStore::new(8, 10).is_err());
    /// let store = PattStore::new(16, 1).unwrap();
    /// assert_eq!(store.slot_in_use(0), Some(false));
    /// ```
    pub fn new(pattern_size: usize, capacity: usize) -> Result<Self, PatternError> {
        if !(PATT_SIZE_MIN..=PATT_SIZE_MAX).contains(&pattern_size) || capacity == 0 {
            return Err(PatternError::InvalidParameter {
                pattern_size,
                capacity,
            });
        }

        Ok(Self::with_slots(pattern_size, capacity))
    }

    fn with_slots(pattern_size: usize, capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| PatternSlot {
                in_use: false,
                variants: std::array::from_fn(|_| PatternVariant::new(pattern_size)),
            })
            .collect();

        Self {
            pattern_size,
            slots,
            num_in_use: 0,
        }
    }

    /// Template resolution in samples per side.
    pub fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently in use.
    pub fn len(&self) -> usize {
        self.num_in_use
    }

    /// Whether no slot is in use.
    pub fn is_empty(&self) -> bool {
        self.num_in_use == 0
    }

    /// Whether the slot at `index` is in use, or `None` if out of range.
    pub fn slot_in_use(&self, index: usize) -> Option<bool> {
        self.slots.get(index).map(|s| s.in_use)
    }

    /// Whether `handle` addresses a slot of this store that is in use.
    pub fn is_in_use(&self, handle: PattHandle) -> bool {
        self.slot_in_use(handle.0).unwrap_or(false)
    }

    /// Reserve the first free slot.
    pub fn alloc(&mut self) -> Result<PattHandle, PatternError> {
        let index = self
            .slots
            .iter()
            .position(|s| !s.in_use)
            .ok_or(PatternError::StoreFull(self.slots.len()))?;
        self.slots[index].in_use = true;
        self.num_in_use += 1;
        Ok(PattHandle(index))
    }

    /// Return a slot to the store, clearing its template data.
    pub fn free(&mut self, handle: PattHandle) -> Result<(), PatternError> {
        let slot = self.slot_mut(handle)?;
        for variant in slot.variants.iter_mut() {
            variant.reset();
        }
        slot.in_use = false;
        self.num_in_use -= 1;
        Ok(())
    }

    /// Store one rotation of a template from interleaved 8-bit RGB samples.
    ///
    /// Samples are inverted (`255 - v`) so dark marker ink carries weight, the
    /// grayscale variant is the per-pixel channel mean, and both variants are
    /// centred on their mean before their energy is recorded.
    pub fn load_variant(
        &mut self,
        handle: PattHandle,
        rotation: usize,
        rgb: &[u8],
    ) -> Result<(), PatternError> {
        if rotation >= NUM_ROTATIONS {
            return Err(PatternError::InvalidRotation(rotation));
        }
        let n = self.pattern_size * self.pattern_size;
        if rgb.len() != n * 3 {
            return Err(PatternError::SampleCount {
                expected: n * 3,
                actual: rgb.len(),
            });
        }

        let variant = &mut self.slot_mut(handle)?.variants[rotation];

        for (dst, &src) in variant.color.iter_mut().zip(rgb.iter()) {
            *dst = 255 - src as i32;
        }
        for (dst, px) in variant.bw.iter_mut().zip(variant.color.chunks_exact(3)) {
            *dst = (px[0] + px[1] + px[2]) / 3;
        }

        variant.energy = center_and_energy(&mut variant.color);
        variant.energy_bw = center_and_energy(&mut variant.bw);
        Ok(())
    }

    /// Allocate a slot and load all four rotations into it.
    ///
    /// The slot is released again if any rotation fails to load.
    pub fn load(&mut self, rotations: [&[u8]; NUM_ROTATIONS]) -> Result<PattHandle, PatternError> {
        let handle = self.alloc()?;
        for (rotation, rgb) in rotations.iter().enumerate() {
            if let Err(e) = self.load_variant(handle, rotation, rgb) {
                self.free(handle)?;
                return Err(e);
            }
        }
        log::debug!("Loaded pattern into slot {}", handle.index());
        Ok(handle)
    }

    /// Read one rotation of an in-use template.
    pub fn variant(
        &self,
        handle: PattHandle,
        rotation: usize,
    ) -> Result<&PatternVariant, PatternError> {
        if rotation >= NUM_ROTATIONS {
            return Err(PatternError::InvalidRotation(rotation));
        }
        let slot = self
            .slots
            .get(handle.0)
            .ok_or(PatternError::InvalidHandle(handle.0))?;
        if !slot.in_use {
            return Err(PatternError::SlotNotInUse(handle.0));
        }
        Ok(&slot.variants[rotation])
    }

    /// Free every slot still in use and release the store.
    ///
    /// Returns the number of slots that were still in use.
    pub fn destroy(mut self) -> usize {
        let mut released = 0;
        for index in 0..self.slots.len() {
            if self.slots[index].in_use && self.free(PattHandle(index)).is_ok() {
                released += 1;
            }
        }
        log::debug!(
            "Destroyed pattern store of {} slots, {} still in use",
            self.slots.len(),
            released
        );
        released
    }

    fn slot_mut(&mut self, handle: PattHandle) -> Result<&mut PatternSlot, PatternError> {
        let slot = self
            .slots
            .get_mut(handle.0)
            .ok_or(PatternError::InvalidHandle(handle.0))?;
        if !slot.in_use {
            return Err(PatternError::SlotNotInUse(handle.0));
        }
        Ok(slot)
    }
}

impl Default for PattStore {
    /// A store of 50 slots for 16x16 templates.
    fn default() -> Self {
        Self::with_slots(PATT_SIZE_DEFAULT, PATT_NUM_DEFAULT)
    }
}

fn center_and_energy(samples: &mut [i32]) -> f64 {
    let sum: i64 = samples.iter().map(|&v| v as i64).sum();
    let mean = (sum / samples.len() as i64) as i32;
    let mut sq = 0.0f64;
    for v in samples.iter_mut() {
        *v -= mean;
        sq += (*v as f64) * (*v as f64);
    }
    let energy = sq.sqrt();
    if energy == 0.0 {
        MIN_ENERGY
    } else {
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn checker(size: usize) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(size * size * 3);
        for y in 0..size {
            for x in 0..size {
                let v = if (x / 4 + y / 4) % 2 == 0 { 0 } else { 255 };
                rgb.extend_from_slice(&[v, v, v]);
            }
        }
        rgb
    }

    #[test]
    fn test_new_rejects_small_size() {
        assert_eq!(
            PattStore::new(8, 10).err(),
            Some(PatternError::InvalidParameter {
                pattern_size: 8,
                capacity: 10
            })
        );
    }

    #[test]
    fn test_new_rejects_large_size_and_zero_capacity() {
        assert!(PattStore::new(PATT_SIZE_MAX + 1, 10).is_err());
        assert!(PattStore::new(16, 0).is_err());
        assert!(PattStore::new(PATT_SIZE_MAX, 1).is_ok());
    }

    #[test]
    fn test_new_single_slot() -> Result<(), PatternError> {
        let store = PattStore::new(16, 1)?;
        assert_eq!(store.capacity(), 1);
        assert_eq!(store.pattern_size(), 16);
        assert!(store.is_empty());
        assert_eq!(store.slot_in_use(0), Some(false));
        assert_eq!(store.slot_in_use(1), None);
        Ok(())
    }

    #[test]
    fn test_alloc_until_full() -> Result<(), PatternError> {
        let mut store = PattStore::new(16, 2)?;
        let a = store.alloc()?;
        let b = store.alloc()?;
        assert_eq!((a.index(), b.index()), (0, 1));
        assert_eq!(store.alloc(), Err(PatternError::StoreFull(2)));

        store.free(a)?;
        assert_eq!(store.len(), 1);
        assert!(!store.is_in_use(a));
        assert!(store.is_in_use(b));
        assert_eq!(store.free(a), Err(PatternError::SlotNotInUse(0)));
        assert_eq!(store.alloc()?.index(), 0);
        Ok(())
    }

    #[test]
    fn test_load_variant_centres_samples() -> Result<(), PatternError> {
        let mut store = PattStore::new(16, 1)?;
        let handle = store.alloc()?;
        store.load_variant(handle, 2, &checker(16))?;

        let variant = store.variant(handle, 2)?;
        // inverted samples are 255 or 0 with an integer mean of 127
        assert_eq!(variant.color[0], 128);
        assert_eq!(variant.color[12], -127);
        assert_eq!(variant.bw[0], 128);
        assert_eq!(variant.bw[4], -127);
        assert_relative_eq!(variant.energy_bw, (256.0 * 127.5f64.powi(2)).sqrt(), epsilon = 1.0);
        Ok(())
    }

    #[test]
    fn test_load_flat_template_has_min_energy() -> Result<(), PatternError> {
        let mut store = PattStore::new(16, 1)?;
        let flat = vec![200u8; 16 * 16 * 3];
        let handle = store.load([flat.as_slice(); 4])?;
        assert_eq!(store.variant(handle, 0)?.energy, MIN_ENERGY);
        Ok(())
    }

    #[test]
    fn test_load_releases_slot_on_error() -> Result<(), PatternError> {
        let mut store = PattStore::new(16, 1)?;
        let good = checker(16);
        let short = vec![0u8; 10];
        let res = store.load([good.as_slice(), good.as_slice(), short.as_slice(), good.as_slice()]);
        assert_eq!(
            res,
            Err(PatternError::SampleCount {
                expected: 768,
                actual: 10
            })
        );
        assert_eq!(store.slot_in_use(0), Some(false));
        Ok(())
    }

    #[test]
    fn test_destroy_frees_in_use_slots() -> Result<(), PatternError> {
        let mut store = PattStore::new(16, 3)?;
        store.alloc()?;
        store.alloc()?;
        assert_eq!(store.destroy(), 2);
        Ok(())
    }

    #[test]
    fn test_independent_stores() -> Result<(), PatternError> {
        let mut a = PattStore::new(16, 1)?;
        let b = PattStore::default();
        a.alloc()?;
        assert_eq!(b.len(), 0);
        assert_eq!(b.capacity(), PATT_NUM_DEFAULT);
        Ok(())
    }
}
