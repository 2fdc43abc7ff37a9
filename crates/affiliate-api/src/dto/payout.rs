use affiliate_analytics::Bucket;
use affiliate_db::models::PaidInvoice;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutInvoiceDTO {
    /// When the invoice was paid.
    pub date: Option<DateTime<Utc>>,
    pub program_name: String,
    pub program_logo: Option<String>,
    pub status: String,
    pub amount: i32,
    pub fee: i32,
    pub total: i32,
}

impl From<PaidInvoice> for PayoutInvoiceDTO {
    fn from(paid: PaidInvoice) -> Self {
        Self {
            date: paid.invoice.paid_at,
            program_name: paid.program_name,
            program_logo: paid.program_logo,
            status: paid.invoice.status,
            amount: paid.invoice.amount,
            fee: paid.invoice.fee,
            total: paid.invoice.total,
        }
    }
}

/// One period of the payouts chart, amounts in cents.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayoutTimeseriesPoint {
    /// Period start.
    pub date: DateTime<Utc>,
    pub payouts: i64,
    pub fees: i64,
    pub total: i64,
}

impl From<&Bucket> for PayoutTimeseriesPoint {
    fn from(bucket: &Bucket) -> Self {
        Self {
            date: bucket.date_utc(),
            payouts: bucket.point.payouts,
            fees: bucket.point.fees,
            total: bucket.point.total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutsResponse {
    pub invoices: Vec<PayoutInvoiceDTO>,
    pub timeseries_data: Vec<PayoutTimeseriesPoint>,
}
