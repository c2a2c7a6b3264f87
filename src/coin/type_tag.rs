//! Extract the inner type argument from framework wrapper types.

const COIN_PREFIX: &str = "0x2::coin::Coin<";
const TREASURY_CAP_PREFIX: &str = "0x2::coin::TreasuryCap<";

fn wrapped_type_arg<'a>(type_string: &'a str, prefix: &str) -> Option<&'a str> {
    let inner = type_string.strip_prefix(prefix)?.strip_suffix('>')?;
    (!inner.is_empty()).then_some(inner)
}

/// `0x2::coin::Coin<T>` -> `T`
pub fn coin_type_arg(type_string: &str) -> Option<&str> {
    wrapped_type_arg(type_string, COIN_PREFIX)
}

/// `0x2::coin::TreasuryCap<T>` -> `T`
pub fn treasury_cap_type_arg(type_string: &str) -> Option<&str> {
    wrapped_type_arg(type_string, TREASURY_CAP_PREFIX)
}

/// Type argument of either wrapper.
pub fn any_coin_type_arg(type_string: &str) -> Option<&str> {
    coin_type_arg(type_string).or_else(|| treasury_cap_type_arg(type_string))
}
