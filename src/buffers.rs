use crate::syllable::CharSlot;

/// Slots a single word may hold before the buffer gives up on it.
pub const MAX_SLOTS: usize = 16;
/// Bytes of raw keystrokes remembered for one word.
pub const MAX_RAW: usize = 32;
/// Bytes of source keys remembered for one slot.
pub const MAX_SLOT_KEYS: usize = 8;

#[cfg(feature = "heapless")]
pub type SlotVec = heapless::Vec<CharSlot, MAX_SLOTS>;

#[cfg(feature = "heapless")]
pub type RawBuffer = heapless::String<MAX_RAW>;

#[cfg(feature = "heapless")]
pub type KeyBuffer = heapless::String<MAX_SLOT_KEYS>;

#[cfg(not(feature = "heapless"))]
pub type SlotVec = Vec<CharSlot>;

#[cfg(not(feature = "heapless"))]
pub type RawBuffer = String;

#[cfg(not(feature = "heapless"))]
pub type KeyBuffer = String;

#[cfg(feature = "heapless")]
#[inline(always)]
pub fn new_slot_vec() -> SlotVec {
    SlotVec::new()
}

#[cfg(feature = "heapless")]
#[inline(always)]
pub fn new_raw_buffer() -> RawBuffer {
    RawBuffer::new()
}

#[cfg(feature = "heapless")]
#[inline(always)]
pub fn new_key_buffer() -> KeyBuffer {
    KeyBuffer::new()
}

#[cfg(feature = "heapless")]
#[inline(always)]
pub fn push_slot(slots: &mut SlotVec, slot: CharSlot) -> Result<(), CharSlot> {
    slots.push(slot)
}

#[cfg(feature = "heapless")]
#[inline(always)]
pub fn push_raw(raw: &mut RawBuffer, key: char) -> bool {
    raw.push(key).is_ok()
}

#[cfg(feature = "heapless")]
#[inline(always)]
pub fn push_slot_key(keys: &mut KeyBuffer, key: char) -> bool {
    keys.push(key).is_ok()
}

#[cfg(not(feature = "heapless"))]
#[inline(always)]
pub fn new_slot_vec() -> SlotVec {
    Vec::with_capacity(MAX_SLOTS)
}

#[cfg(not(feature = "heapless"))]
#[inline(always)]
pub fn new_raw_buffer() -> RawBuffer {
    String::with_capacity(MAX_RAW)
}

#[cfg(not(feature = "heapless"))]
#[inline(always)]
pub fn new_key_buffer() -> KeyBuffer {
    String::new()
}

// The std variants enforce the same capacities as the heapless ones so both
// builds overflow at the same point.
#[cfg(not(feature = "heapless"))]
#[inline(always)]
pub fn push_slot(slots: &mut SlotVec, slot: CharSlot) -> Result<(), CharSlot> {
    if slots.len() >= MAX_SLOTS {
        return Err(slot);
    }
    slots.push(slot);
    Ok(())
}

#[cfg(not(feature = "heapless"))]
#[inline(always)]
pub fn push_raw(raw: &mut RawBuffer, key: char) -> bool {
    if raw.len() + key.len_utf8() > MAX_RAW {
        return false;
    }
    raw.push(key);
    true
}

#[cfg(not(feature = "heapless"))]
#[inline(always)]
pub fn push_slot_key(keys: &mut KeyBuffer, key: char) -> bool {
    if keys.len() + key.len_utf8() > MAX_SLOT_KEYS {
        return false;
    }
    keys.push(key);
    true
}
