use std::collections::BTreeMap;

use affiliate_db::models::{CommissionWithRelations, Customer, Partner};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerDTO {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub image: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Partner> for PartnerDTO {
    fn from(partner: Partner) -> Self {
        Self {
            id: partner.id,
            name: partner.name,
            email: partner.email,
            image: partner.image,
            country: partner.country,
            created_at: partner.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDTO {
    pub id: String,
    pub external_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerDTO {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            external_id: customer.external_id,
            name: customer.name,
            email: customer.email,
            avatar: customer.avatar,
            country: customer.country,
            created_at: customer.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionDTO {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: i32,
    pub earnings: i32,
    pub currency: String,
    pub status: String,
    pub invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub quantity: i32,
    pub partner: PartnerDTO,
    /// Null for click commissions.
    pub customer: Option<CustomerDTO>,
}

impl From<CommissionWithRelations> for CommissionDTO {
    fn from(row: CommissionWithRelations) -> Self {
        let commission = row.commission;
        Self {
            id: commission.id,
            kind: commission.kind,
            amount: commission.amount,
            earnings: commission.earnings,
            currency: commission.currency,
            status: commission.status,
            invoice_id: commission.invoice_id,
            created_at: commission.created_at,
            updated_at: commission.updated_at,
            quantity: commission.quantity,
            partner: row.partner.into(),
            customer: row.customer.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommissionCountDTO {
    pub count: i64,
    pub amount: i64,
    pub earnings: i64,
}

/// Keyed by commission status, plus `all`.
pub type CommissionsCountResponse = BTreeMap<String, CommissionCountDTO>;
