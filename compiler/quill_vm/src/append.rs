//! Appending a run of registers to a sequence.

use crate::registers::{Addr, Boxed, Registers};
use crate::{Env, VmError};
use quill_value::SliceValue;

impl Registers {
    /// Append the `len` registers starting at `first` to `slice`.
    ///
    /// Registers come from the bank matching the element kind and are
    /// converted to it: integers wrap to the element width, positive
    /// integers are true for boolean elements, floats round to the element
    /// width. When `slice` has room the result shares its storage;
    /// otherwise the elements move to a new buffer whose size is reported
    /// to `env`.
    pub fn append_slice(
        &self,
        first: Addr,
        len: usize,
        slice: &SliceValue,
        env: &Env,
    ) -> Result<SliceValue, VmError> {
        if len == 0 {
            return Ok(slice.clone());
        }
        let (appended, grown) = match slice {
            SliceValue::Bool(s) => {
                let items = self.int_run(first, len)?.iter().map(|&n| n > 0).collect();
                let (s, grown) = s.append(items);
                (SliceValue::Bool(s), grown)
            }
            SliceValue::Int(kind, s) => {
                let items = self.int_run(first, len)?.iter().map(|&n| kind.narrow(n)).collect();
                let (s, grown) = s.append(items);
                (SliceValue::Int(*kind, s), grown)
            }
            SliceValue::Float(kind, s) => {
                let items = self.float_run(first, len)?.iter().map(|&f| kind.narrow(f)).collect();
                let (s, grown) = s.append(items);
                (SliceValue::Float(*kind, s), grown)
            }
            SliceValue::Str(kind, s) => {
                let (s, grown) = s.append(self.string_run(first, len)?.to_vec());
                (SliceValue::Str(*kind, s), grown)
            }
            SliceValue::Boxed(s) => {
                let items = self
                    .general_run(first, len)?
                    .iter()
                    .map(|slot| match slot {
                        Boxed::Value(value) => Ok(value.clone()),
                        Boxed::Ref(_) => Err(VmError::UnexpectedReference(first)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let (s, grown) = s.append(items);
                (SliceValue::Boxed(s), grown)
            }
        };
        if let Some(cap) = grown {
            let bytes = cap.saturating_mul(slice.elem_kind().byte_size());
            tracing::trace!(cap, bytes, kind = slice.type_name(), "slice grown");
            env.alloc(i64::try_from(bytes).unwrap_or(i64::MAX))?;
        }
        Ok(appended)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
