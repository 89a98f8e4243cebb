// Layer 1: Standard library imports
use std::fmt::Debug;

// Layer 2: Third-party crate imports
// (none for this module)

// Layer 3: Internal module imports
// (none)

/// Core message trait with compile-time type identification.
///
/// # Zero-cost routing
/// Routing is keyed by [`TYPE_KEY`](Message::TYPE_KEY) instead of runtime
/// reflection: the engine's registry is a map from this string to the
/// workers that host an actor for `Self`, resolved once per `send`/`call`/
/// `broadcast` rather than walking a type hierarchy.
///
/// # Reply type
/// `Reply` fixes, at compile time, what a handler may hand back when this
/// message is delivered via [`Engine::call`](crate::engine::Engine::call).
/// Messages that are only ever `send`/`broadcast` can set `Reply = ()`.
///
/// # Example
/// ```rust
/// use rotor_rt::message::Message;
///
/// #[derive(Debug, Clone)]
/// struct Increment;
///
/// impl Message for Increment {
///     const TYPE_KEY: &'static str = "counter.increment";
///     type Reply = u64;
/// }
/// ```
pub trait Message: Send + Clone + Debug + 'static {
    /// Process-unique identifier for this message type, resolved at compile
    /// time. Two distinct message types MUST use distinct keys.
    const TYPE_KEY: &'static str;

    /// The value type a handler may return when this message is delivered
    /// as a `call`. Use `()` for messages that are only ever fire-and-forget.
    type Reply: Send + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Ping;

    impl Message for Ping {
        const TYPE_KEY: &'static str = "test.ping";
        type Reply = ();
    }

    #[derive(Debug, Clone)]
    struct Add {
        a: i64,
        b: i64,
    }

    impl Message for Add {
        const TYPE_KEY: &'static str = "test.add";
        type Reply = i64;
    }

    #[test]
    fn type_key_is_the_compile_time_constant() {
        assert_eq!(Ping::TYPE_KEY, "test.ping");
        assert_eq!(Add::TYPE_KEY, "test.add");
    }

    #[test]
    fn distinct_types_have_distinct_keys() {
        assert_ne!(Ping::TYPE_KEY, Add::TYPE_KEY);
    }
}
