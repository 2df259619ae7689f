// handlers/mod.rs - Two access tiers
//
// Public handlers serve anonymous and signed-in callers alike; protected
// handlers require a resolved user. Both tiers share route paths, so the
// tier is chosen per method (`get(public).patch(protected)`) rather than
// per router.

pub mod protected;
pub mod public;
