use actix::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::customer::{CustomerProfile, LoyaltyTransaction};
use crate::domain::membership::MembershipError;
use crate::service::{MembershipService, OrderOutcome};

// ============================================================================
// Actor Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "Result<CustomerProfile, MembershipError>")]
pub struct RegisterCustomer {
    pub customer_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "Result<OrderOutcome, MembershipError>")]
pub struct CompleteOrder {
    pub customer_id: Uuid,
    pub order_total: f64,
}

#[derive(Message)]
#[rtype(result = "Result<f64, MembershipError>")]
pub struct QuoteDiscountedPrice {
    pub customer_id: Uuid,
    pub price: f64,
}

#[derive(Message)]
#[rtype(result = "Result<CustomerProfile, MembershipError>")]
pub struct GetProfile {
    pub customer_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "Result<Vec<LoyaltyTransaction>, MembershipError>")]
pub struct GetLoyaltyHistory {
    pub customer_id: Uuid,
}

// ============================================================================
// Membership Actor - Message front for the membership service
// ============================================================================

pub struct MembershipActor {
    service: Arc<MembershipService>,
}

impl MembershipActor {
    pub fn new(service: Arc<MembershipService>) -> Self {
        Self { service }
    }
}

impl Actor for MembershipActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("MembershipActor started");
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<RegisterCustomer> for MembershipActor {
    type Result = ResponseFuture<Result<CustomerProfile, MembershipError>>;

    fn handle(&mut self, msg: RegisterCustomer, _: &mut Self::Context) -> Self::Result {
        let service = self.service.clone();
        Box::pin(async move { service.register_customer(msg.customer_id).await })
    }
}

impl Handler<CompleteOrder> for MembershipActor {
    type Result = ResponseFuture<Result<OrderOutcome, MembershipError>>;

    fn handle(&mut self, msg: CompleteOrder, _: &mut Self::Context) -> Self::Result {
        let service = self.service.clone();
        Box::pin(async move { service.complete_order(msg.customer_id, msg.order_total).await })
    }
}

impl Handler<QuoteDiscountedPrice> for MembershipActor {
    type Result = ResponseFuture<Result<f64, MembershipError>>;

    fn handle(&mut self, msg: QuoteDiscountedPrice, _: &mut Self::Context) -> Self::Result {
        let service = self.service.clone();
        Box::pin(async move { service.quote_price(msg.customer_id, msg.price).await })
    }
}

impl Handler<GetProfile> for MembershipActor {
    type Result = ResponseFuture<Result<CustomerProfile, MembershipError>>;

    fn handle(&mut self, msg: GetProfile, _: &mut Self::Context) -> Self::Result {
        let service = self.service.clone();
        Box::pin(async move { service.profile(msg.customer_id).await })
    }
}

impl Handler<GetLoyaltyHistory> for MembershipActor {
    type Result = ResponseFuture<Result<Vec<LoyaltyTransaction>, MembershipError>>;

    fn handle(&mut self, msg: GetLoyaltyHistory, _: &mut Self::Context) -> Self::Result {
        let service = self.service.clone();
        Box::pin(async move { service.loyalty_history(msg.customer_id).await })
    }
}
