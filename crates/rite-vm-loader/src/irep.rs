//! IREP section decoder
//!
//! Each record becomes one [`CodeUnit`], registered through the ledger as soon
//! as it is complete. Nothing decoded for a record outlives it unless the
//! record made it into the table.

use rite_vm_bytecode::{Code, CodeUnit, CodeUnitIndex, Constant, ConstantPool, Symbol};
use rite_vm_core::State;

use crate::error::Result;
use crate::format::{NULL_SYM_LEN, PoolTag};
use crate::ledger::AllocationLedger;
use crate::literal::{parse_float, parse_integer};
use crate::source::ByteSource;

/// Minimum encoded size of one pool entry (`tag` + `len`)
const POOL_ENTRY_MIN: u64 = 3;

/// Outcome of decoding one IREP section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IrepSection {
    /// Section-relative base index from the payload prefix
    pub base_index: u16,
    /// Index of the first unit this section registered
    pub first: Option<CodeUnitIndex>,
    /// Number of units registered
    pub count: usize,
}

/// Decode every record of an IREP payload and register the resulting units
pub(crate) fn read_irep_section<S: ByteSource + ?Sized>(
    src: &mut S,
    ledger: &mut AllocationLedger<'_>,
) -> Result<IrepSection> {
    let nrecords = src.read_u16()?;
    let base_index = src.read_u16()?;

    let mut first = None;
    for _ in 0..nrecords {
        let unit = read_irep_record(src, ledger.state_mut())?;
        let index = ledger.register(unit)?;
        first.get_or_insert(index);
    }

    Ok(IrepSection {
        base_index,
        first,
        count: usize::from(nrecords),
    })
}

/// Decode one record into a code unit. Symbol names are interned into `state`.
pub(crate) fn read_irep_record<S: ByteSource + ?Sized>(
    src: &mut S,
    state: &mut State,
) -> Result<CodeUnit> {
    let start = src.position();
    let record_len = src.read_u32()?;
    let local_count = src.read_u16()?;
    let register_count = src.read_u16()?;

    let iseq = read_iseq(src)?;
    let pool = read_pool(src)?;
    let syms = read_syms(src, state)?;

    let consumed = src.position() - start;
    if consumed != u64::from(record_len) {
        tracing::trace!(
            target: "rite::load",
            offset = start,
            record_len,
            consumed,
            "irep record length differs from parsed length"
        );
    }
    tracing::trace!(
        target: "rite::load",
        offset = start,
        ilen = iseq.len(),
        plen = pool.len(),
        slen = syms.len(),
        "decoded irep record"
    );

    Ok(CodeUnit::builder()
        .local_count(local_count)
        .register_count(register_count)
        .iseq(iseq)
        .pool(pool)
        .syms(syms)
        .build())
}

fn read_iseq<S: ByteSource + ?Sized>(src: &mut S) -> Result<Vec<Code>> {
    let ilen = src.read_u32()?;
    src.ensure(u64::from(ilen) * 4)?;

    let mut iseq = Vec::new();
    iseq.try_reserve_exact(ilen as usize)?;
    for _ in 0..ilen {
        iseq.push(Code(src.read_u32()?));
    }
    Ok(iseq)
}

fn read_pool<S: ByteSource + ?Sized>(src: &mut S) -> Result<ConstantPool> {
    let plen = src.read_u32()?;
    src.ensure(u64::from(plen) * POOL_ENTRY_MIN)?;

    let mut constants = Vec::new();
    constants.try_reserve_exact(plen as usize)?;
    for _ in 0..plen {
        constants.push(read_pool_entry(src)?);
    }
    Ok(ConstantPool::from(constants))
}

fn read_pool_entry<S: ByteSource + ?Sized>(src: &mut S) -> Result<Constant> {
    let tag = PoolTag::from_u8(src.read_u8()?);
    let len = usize::from(src.read_u16()?);

    Ok(match tag {
        PoolTag::Integer => parse_integer(&src.read_vec(len)?),
        PoolTag::Float => Constant::Float(parse_float(&src.read_vec(len)?)),
        PoolTag::String => Constant::string(src.read_vec(len)?),
        PoolTag::Other(raw) => {
            src.skip(len as u64)?;
            tracing::trace!(target: "rite::load", tag = raw, len, "unknown pool tag, using nil");
            Constant::Nil
        }
    })
}

fn read_syms<S: ByteSource + ?Sized>(
    src: &mut S,
    state: &mut State,
) -> Result<Vec<Option<Symbol>>> {
    let slen = src.read_u32()?;
    src.ensure(u64::from(slen) * 2)?;

    let mut syms = Vec::new();
    syms.try_reserve_exact(slen as usize)?;
    for _ in 0..slen {
        let len = src.read_u16()?;
        let sym = if len == NULL_SYM_LEN {
            None
        } else {
            let name = src.read_vec(usize::from(len))?;
            Some(state.intern(&name)?)
        };
        syms.push(sym);
    }
    Ok(syms)
}
