/// Classification for fallback policy.
///
/// Used to determine how the price resolver should respond to errors from
/// vendors. Exactly one fallback attempt is made per resolution, so this only
/// distinguishes "worth trying the other vendor" from "stop now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackClass {
    /// The failure is local to one vendor. Try the alternate vendor before
    /// surfacing a failure.
    AlternateProvider,

    /// The error is terminal. Switching vendors cannot change the outcome.
    Terminal,
}
