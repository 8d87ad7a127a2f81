//! Typed element reads through accessors.

use crate::error::{Malformed, PipelineError};

use super::types::{ComponentType, ElementType};
use super::Asset;

/// Reads typed elements out of one asset's buffers through its accessors,
/// widening components to f32 / u32.
pub struct AccessorReader<'a> {
    asset: &'a Asset,
}

impl<'a> AccessorReader<'a> {
    /// Create a reader over an asset.
    pub fn new(asset: &'a Asset) -> Self {
        Self { asset }
    }

    /// Read element `element` of accessor `accessor` as float lanes into
    /// `out`, widening integer components according to the accessor's
    /// normalized flag. At most `min(out.len(), element float count)` lanes
    /// are written.
    pub fn read_float(
        &self,
        accessor: usize,
        element: usize,
        out: &mut [f32],
    ) -> Result<(), PipelineError> {
        let (acc, data, start) = self.element_range(accessor, element)?;
        let comp_size = acc.component.size();
        let lanes = out.len().min(acc.element.float_count());
        if start + lanes * comp_size > data.len() {
            return Err(Malformed::OutOfBounds { accessor }.into());
        }
        for (lane, slot) in out.iter_mut().enumerate().take(lanes) {
            let offset = start + lane * comp_size;
            *slot = widen_component(&data[offset..], acc.component, acc.normalized);
        }
        Ok(())
    }

    /// Read element `element` of accessor `accessor` as a u32 index.
    ///
    /// Fails if the accessor's element type is not scalar. Unsigned
    /// components widen; any other component type reads as 0, matching the
    /// index-widening contract.
    pub fn read_index(&self, accessor: usize, element: usize) -> Result<u32, PipelineError> {
        let (acc, data, start) = self.element_range(accessor, element)?;
        if acc.element != ElementType::Scalar {
            return Err(Malformed::NonScalarIndices { accessor }.into());
        }
        if start + acc.component.size() > data.len() {
            return Err(Malformed::OutOfBounds { accessor }.into());
        }
        let value = match acc.component {
            ComponentType::U8 => data[start] as u32,
            ComponentType::U16 => u16::from_le_bytes([data[start], data[start + 1]]) as u32,
            ComponentType::U32 => u32::from_le_bytes([
                data[start],
                data[start + 1],
                data[start + 2],
                data[start + 3],
            ]),
            _ => 0,
        };
        Ok(value)
    }

    /// Resolve the accessor chain and return the accessor, its buffer bytes,
    /// and the byte offset of the requested element.
    fn element_range(
        &self,
        accessor: usize,
        element: usize,
    ) -> Result<(&'a super::types::Accessor, &'a [u8], usize), PipelineError> {
        let acc = self
            .asset
            .accessors
            .get(accessor)
            .ok_or(Malformed::DanglingReference {
                entity: "accessor",
                index: accessor,
            })?;
        let view_index = acc.view.ok_or(Malformed::MissingView { accessor })?;
        let view = self
            .asset
            .views
            .get(view_index)
            .ok_or(Malformed::DanglingReference {
                entity: "buffer view",
                index: view_index,
            })?;
        let buffer = self
            .asset
            .buffers
            .get(view.buffer)
            .ok_or(Malformed::DanglingReference {
                entity: "buffer",
                index: view.buffer,
            })?;
        let start = view.offset + acc.offset + element * acc.effective_stride();
        Ok((acc, buffer.data.as_slice(), start))
    }
}

/// Widen one component at the head of `data` to f32.
fn widen_component(data: &[u8], component: ComponentType, normalized: bool) -> f32 {
    match component {
        ComponentType::I8 => {
            let v = data[0] as i8;
            if normalized {
                (v as f32 / 127.0).max(-1.0)
            } else {
                v as f32
            }
        }
        ComponentType::U8 => {
            let v = data[0];
            if normalized {
                v as f32 / 255.0
            } else {
                v as f32
            }
        }
        ComponentType::I16 => {
            let v = i16::from_le_bytes([data[0], data[1]]);
            if normalized {
                (v as f32 / 32767.0).max(-1.0)
            } else {
                v as f32
            }
        }
        ComponentType::U16 => {
            let v = u16::from_le_bytes([data[0], data[1]]);
            if normalized {
                v as f32 / 65535.0
            } else {
                v as f32
            }
        }
        ComponentType::U32 => u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as f32,
        ComponentType::F32 => f32::from_le_bytes([data[0], data[1], data[2], data[3]]),
    }
}
