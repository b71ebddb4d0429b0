//! Resolution and conversion of a single leaf field.

use crate::coerce::Conversion;
use crate::context::{BindContext, DEFAULT_LITERAL_DELIMITER};
use crate::error::Error;
use crate::field::{FieldDescriptor, FieldSlot};
use crate::log::{debug, trace};
use crate::tag::TagOptions;
use crate::validation::Resolution;

/// Binds one annotated, non-nested field and returns the key it resolved.
///
/// The effective value is the environment text when non-empty, otherwise
/// the declared default. Validators run first and see the effective value
/// even when it is empty; an empty effective value leaves the field as is.
pub(crate) fn bind_field(
    ctx: &mut BindContext,
    descriptor: &FieldDescriptor,
    options: &TagOptions,
    slot: &mut FieldSlot<'_>,
    path: &str,
) -> Result<String, Error> {
    let key = ctx.key_for(&options.name);

    let env_value = ctx.env().get(&key).map(str::to_string);
    let found = env_value.is_some();
    let env_value = env_value.unwrap_or_default();

    let from_default = env_value.is_empty();
    let value = if from_default {
        options.default_value()
    } else {
        env_value.as_str()
    };

    let resolution = Resolution {
        field: path,
        key: &key,
        found,
        env_value: &env_value,
        value,
    };
    ctx.validate(&options.validate, &resolution)?;

    if value.is_empty() {
        trace!(field = %path, key = %key, "no value");
        return Ok(key);
    }

    let delimiter = if from_default {
        DEFAULT_LITERAL_DELIMITER
    } else {
        ctx.effective_slice_delimiter()
    };

    slot.assign(value, delimiter, ctx.parsers())
        .map_err(|conversion| match conversion {
            Conversion::NoParser => Error::NoParser {
                field: path.to_string(),
                type_name: descriptor.type_name.to_string(),
            },
            Conversion::Failed(source) => Error::parse(path, descriptor.type_name, value, source),
        })?;

    debug!(
        field = %path,
        key = %key,
        origin = if from_default { "default" } else { "environment" },
        "bound field"
    );

    Ok(key)
}
