//! LINE section decoder
//!
//! Records attach filename and per-instruction line tables to units that an
//! earlier IREP section of the same load registered.

use rite_vm_bytecode::{CodeUnitIndex, DebugInfo};

use crate::error::{LoadError, Result};
use crate::ledger::AllocationLedger;
use crate::source::ByteSource;

/// Decode a LINE payload, returning how many records were attached
pub(crate) fn read_lineno_section<S: ByteSource + ?Sized>(
    src: &mut S,
    ledger: &mut AllocationLedger<'_>,
) -> Result<usize> {
    let nrecords = src.read_u16()?;
    let base_index = usize::from(src.read_u16()?);

    for n in 0..usize::from(nrecords) {
        let index = ledger.base() + base_index + n;
        let len = ledger.state().code_units().len();
        if index >= len {
            return Err(LoadError::IndexOutOfRange { index, len });
        }

        let info = read_lineno_record(src)?;
        let ilen = CodeUnitIndex::try_from(index)
            .ok()
            .and_then(|i| ledger.state().code_unit(i))
            .map_or(0, |unit| unit.ilen());
        if ilen != info.lines.len() {
            tracing::debug!(
                target: "rite::load",
                index,
                ilen,
                lines = info.lines.len(),
                "line table length differs from instruction count"
            );
        }
        ledger.state_mut().attach_debug_info(index, info)?;
    }

    Ok(usize::from(nrecords))
}

fn read_lineno_record<S: ByteSource + ?Sized>(src: &mut S) -> Result<DebugInfo> {
    let _record_len = src.read_u32()?;

    let fname_len = usize::from(src.read_u16()?);
    let fname = src.read_vec(fname_len)?;

    let ninstr = src.read_u32()?;
    src.ensure(u64::from(ninstr) * 2)?;
    let mut lines = Vec::new();
    lines.try_reserve_exact(ninstr as usize)?;
    for _ in 0..ninstr {
        lines.push(src.read_u16()?);
    }

    Ok(DebugInfo::new(fname, lines))
}
