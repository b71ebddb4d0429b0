//! Depth-first traversal of a bindable struct.

use crate::binder;
use crate::context::BindContext;
use crate::error::Error;
use crate::field::{Bind, FieldDescriptor, FieldSlot};
use crate::log::trace;
use crate::tag::{TagError, TagOptions};

/// Binds every annotated field of `target`, recursing into nested ones.
///
/// `path` is the dotted path of `target` itself, empty for the root.
pub(crate) fn walk(ctx: &mut BindContext, target: &mut dyn Bind, path: &str) -> Result<(), Error> {
    for (index, descriptor) in target.descriptors().iter().enumerate() {
        let field_path = join(path, descriptor.name);

        if !descriptor.writable {
            trace!(field = %field_path, "skipping read-only field");
            continue;
        }

        let options = match descriptor.annotation(ctx.tag_name()) {
            Some(annotation) => TagOptions::parse(annotation).map_err(|TagError::UnknownKey(key)| {
                Error::UnknownOption {
                    field: field_path.clone(),
                    key,
                }
            })?,
            None if descriptor.embedded => TagOptions {
                nested: true,
                ..TagOptions::default()
            },
            None => {
                trace!(field = %field_path, tag = ctx.tag_name(), "no annotation");
                continue;
            }
        };

        let Some(mut slot) = target.field_mut(index) else {
            continue;
        };

        if options.nested {
            // Embedded sequences keep their name so indices stay unambiguous.
            let inner_path = if descriptor.embedded && !slot.is_sequence() {
                path
            } else {
                field_path.as_str()
            };
            walk_nested(ctx, descriptor, &mut slot, &field_path, inner_path)?;
            continue;
        }

        let key = binder::bind_field(ctx, descriptor, &options, &mut slot, &field_path)?;

        if options.unset {
            ctx.unset(&key);
        }
    }

    Ok(())
}

fn walk_nested(
    ctx: &mut BindContext,
    descriptor: &FieldDescriptor,
    slot: &mut FieldSlot<'_>,
    field_path: &str,
    path: &str,
) -> Result<(), Error> {
    let indexed = slot.is_sequence();

    let Some(children) = slot.structs() else {
        return Err(Error::NestedNotStruct {
            field: field_path.to_string(),
            type_name: descriptor.type_name.to_string(),
        });
    };

    trace!(field = %path, count = children.len(), "descending");

    for (i, child) in children.into_iter().enumerate() {
        if indexed {
            walk(ctx, child, &format!("{path}[{i}]"))?;
        } else {
            walk(ctx, child, path)?;
        }
    }

    Ok(())
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}
