mod membership_actor;

pub use membership_actor::{
    CompleteOrder, GetLoyaltyHistory, GetProfile, MembershipActor, QuoteDiscountedPrice,
    RegisterCustomer,
};
