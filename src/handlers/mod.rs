// Two security tiers: public (no auth) and protected (valid session token
// required, enforced by the JWT middleware layered over the route group).
pub mod protected;
pub mod public;
