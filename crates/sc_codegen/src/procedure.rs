use crate::{Accessor, FieldBinding};

// -----------------------------------------------------------------------------
// Read procedure

/// One name-matching arm of the member loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberArm {
    /// The wire name followed by the aliases.
    pub names: Vec<String>,
    pub slot: usize,
    pub accessor: Accessor,
    /// A primitive field keeps its current value on a null token.
    pub primitive: bool,
}

/// An operation of a decode procedure, executed in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOp {
    /// Consume a null token and produce null.
    ReturnNullOnNullToken,
    /// Skip a value that is not an object and produce null.
    SkipNonObject,
    BeginObject,
    /// Default-construct the result.
    NewInstance,
    /// Dispatch every name to its arm, skip values of unmatched names.
    ReadMembers(Vec<MemberArm>),
    EndObject,
    /// Fail if the slot is still null.
    RequireNonNull { slot: usize, field: String },
    /// Fail with every listed slot that is still null.
    RequireAllNonNull(Vec<(usize, String)>),
    ReturnInstance,
}

pub(crate) fn read_procedure(fields: &[FieldBinding], aggregate: bool) -> Vec<ReadOp> {
    let arms = fields
        .iter()
        .map(|field| MemberArm {
            names: field.read_names(),
            slot: field.slot,
            accessor: field.accessor,
            primitive: field.primitive().is_some(),
        })
        .collect();

    let mut ops = vec![
        ReadOp::ReturnNullOnNullToken,
        ReadOp::SkipNonObject,
        ReadOp::BeginObject,
        ReadOp::NewInstance,
        ReadOp::ReadMembers(arms),
        ReadOp::EndObject,
    ];

    let required = fields
        .iter()
        .filter(|field| field.required && field.primitive().is_none())
        .map(|field| (field.slot, field.name.clone()));
    if aggregate {
        let required: Vec<_> = required.collect();
        if !required.is_empty() {
            ops.push(ReadOp::RequireAllNonNull(required));
        }
    } else {
        ops.extend(required.map(|(slot, field)| ReadOp::RequireNonNull { slot, field }));
    }

    ops.push(ReadOp::ReturnInstance);
    ops
}

// -----------------------------------------------------------------------------
// Write procedure

/// An operation of an encode procedure, executed in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    BeginObject,
    /// A null value ends the object right away, producing `{}`.
    EndObjectIfNull,
    /// Write a primitive field, which is never absent.
    WriteAlways {
        name: String,
        slot: usize,
        accessor: Accessor,
    },
    /// Write a reference field if it is non-null.
    ///
    /// A null required field fails the encode, a null optional field is
    /// omitted.
    WriteIfPresent {
        name: String,
        field: String,
        slot: usize,
        accessor: Accessor,
        required: bool,
    },
    EndObject,
}

pub(crate) fn write_procedure(fields: &[FieldBinding]) -> Vec<WriteOp> {
    let mut ops = vec![WriteOp::BeginObject, WriteOp::EndObjectIfNull];
    ops.extend(fields.iter().map(|field| {
        if field.primitive().is_some() {
            WriteOp::WriteAlways {
                name: field.wire_name.clone(),
                slot: field.slot,
                accessor: field.accessor,
            }
        } else {
            WriteOp::WriteIfPresent {
                name: field.wire_name.clone(),
                field: field.name.clone(),
                slot: field.slot,
                accessor: field.accessor,
                required: field.required,
            }
        }
    }));
    ops.push(WriteOp::EndObject);
    ops
}

// -----------------------------------------------------------------------------
// Tests
