use crate::ast::{Function, Value};
use ahash::AHashMap;
use std::cmp::Ordering;

static UNDEFINED: Value = Value::Undefined;

/// Positional argument, `undefined` when absent.
fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&UNDEFINED)
}

/// A single array argument spreads into its elements; otherwise every argument counts.
fn spread(args: &[Value]) -> &[Value] {
    match args {
        [Value::Array(items)] => items,
        _ => args,
    }
}

fn numbers(args: &[Value]) -> impl Iterator<Item = f64> + '_ {
    spread(args).iter().filter_map(|value| match value {
        Value::Number(n) => Some(*n),
        Value::String(_) | Value::Bool(_) => Some(value.to_number()).filter(|n| !n.is_nan()),
        _ => None,
    })
}

fn compare_with(args: &[Value], accept: fn(Ordering) -> bool) -> Value {
    let ordering = arg(args, 0).compare(arg(args, 1));
    Value::Bool(ordering.is_some_and(accept))
}

fn binary_number(args: &[Value], op: fn(f64, f64) -> f64) -> Value {
    Value::Number(op(arg(args, 0).to_number(), arg(args, 1).to_number()))
}

// Comparators

fn equals(args: &[Value]) -> Value {
    Value::Bool(arg(args, 0) == arg(args, 1))
}

fn not_equals(args: &[Value]) -> Value {
    Value::Bool(arg(args, 0) != arg(args, 1))
}

fn greater_than(args: &[Value]) -> Value {
    compare_with(args, Ordering::is_gt)
}

fn greater_than_or_equal(args: &[Value]) -> Value {
    compare_with(args, Ordering::is_ge)
}

fn less_than(args: &[Value]) -> Value {
    compare_with(args, Ordering::is_lt)
}

fn less_than_or_equal(args: &[Value]) -> Value {
    compare_with(args, Ordering::is_le)
}

fn is_blank(args: &[Value]) -> Value {
    Value::Bool(arg(args, 0).is_blank())
}

fn not(args: &[Value]) -> Value {
    Value::Bool(!arg(args, 0).is_truthy())
}

fn and(args: &[Value]) -> Value {
    Value::Bool(!args.is_empty() && args.iter().all(Value::is_truthy))
}

fn or(args: &[Value]) -> Value {
    Value::Bool(args.iter().any(Value::is_truthy))
}

// Arrays

fn is_in_array(args: &[Value]) -> Value {
    match arg(args, 1) {
        Value::Array(items) => Value::Bool(items.contains(arg(args, 0))),
        _ => Value::Bool(false),
    }
}

fn array_of_prop(args: &[Value]) -> Value {
    let (Value::Array(items), property) = (arg(args, 0), arg(args, 1)) else {
        return Value::Null;
    };
    let property = property.to_string();
    Value::Array(items.iter().map(|item| item.get_path(&property)).collect())
}

fn array_length(args: &[Value]) -> Value {
    match arg(args, 0) {
        Value::Array(items) => Value::Number(items.len() as f64),
        _ => Value::Null,
    }
}

// Strings

fn length(args: &[Value]) -> Value {
    match arg(args, 0) {
        Value::String(s) => Value::Number(s.chars().count() as f64),
        _ => Value::Null,
    }
}

// Types

fn is_number(args: &[Value]) -> Value {
    Value::Bool(!arg(args, 0).to_number().is_nan())
}

fn is_numeric(args: &[Value]) -> Value {
    let text = arg(args, 0).to_string();
    Value::Bool(!text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()))
}

// Mapping

fn map_value_in(args: &[Value]) -> Value {
    let value = arg(args, 0);
    let (Value::Array(from), Value::Array(to)) = (arg(args, 1), arg(args, 2)) else {
        return Value::Null;
    };
    from.iter()
        .position(|candidates| match candidates {
            Value::Array(list) => list.contains(value),
            other => other == value,
        })
        .map(|index| to.get(index).cloned().unwrap_or_default())
        .unwrap_or(Value::Null)
}

fn if_true_else(args: &[Value]) -> Value {
    if arg(args, 0).is_truthy() {
        arg(args, 1).clone()
    } else {
        arg(args, 2).clone()
    }
}

// Arithmetic

fn sum(args: &[Value]) -> Value {
    Value::Number(numbers(args).sum())
}

fn add(args: &[Value]) -> Value {
    binary_number(args, |a, b| a + b)
}

fn subtract(args: &[Value]) -> Value {
    binary_number(args, |a, b| a - b)
}

fn multiply(args: &[Value]) -> Value {
    binary_number(args, |a, b| a * b)
}

fn divide(args: &[Value]) -> Value {
    binary_number(args, |a, b| a / b)
}

fn min(args: &[Value]) -> Value {
    numbers(args)
        .reduce(f64::min)
        .map_or(Value::Undefined, Value::Number)
}

fn max(args: &[Value]) -> Value {
    numbers(args)
        .reduce(f64::max)
        .map_or(Value::Undefined, Value::Number)
}

/// Defines the default function table and its registration.
macro_rules! define_functions {
    ( $( ($name:expr, $function:ident) ),* $(,)? ) => {
        /// Names present in every default [`Context`](super::Context).
        pub const DEFAULT_FUNCTIONS: &[&str] = &[ $( $name ),* ];

        pub(super) fn register_default_functions(registry: &mut AHashMap<String, Function>) {
            $( registry.insert($name.to_string(), Function::new($name, $function)); )*
        }
    };
}

define_functions! {
    ("equals", equals),
    ("notEquals", not_equals),
    ("greaterThan", greater_than),
    ("greaterThanOrEqual", greater_than_or_equal),
    ("lessThan", less_than),
    ("lessThanOrEqual", less_than_or_equal),
    ("isBlank", is_blank),
    ("not", not),
    ("and", and),
    ("or", or),
    ("isInArray", is_in_array),
    ("arrayOfProp", array_of_prop),
    ("arrayLength", array_length),
    ("length", length),
    ("isNumber", is_number),
    ("isNumeric", is_numeric),
    ("mapValueIn", map_value_in),
    ("ifTrueElse", if_true_else),
    ("sum", sum),
    ("add", add),
    ("subtract", subtract),
    ("multiply", multiply),
    ("divide", divide),
    ("min", min),
    ("max", max),
}
