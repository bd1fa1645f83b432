use serde::{Deserialize, Serialize};

// =============================================================================
// Configuration
// =============================================================================

/// Runtime configuration, read from the environment by the binary.
///
/// Secrets are held here but never echoed back; the health endpoint reports
/// presence booleans only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the hosted Entity Store (e.g. https://xyz.supabase.co).
    pub store_url: String,
    /// Publishable API key sent with every store request.
    pub anon_key: String,
    /// Service-role key for administrative identity creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_role_key: Option<String>,
    /// Static shared secret guarding the one-time admin bootstrap endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_bootstrap_secret: Option<String>,
    /// Address the admin API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Per-request timeout for all remote calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Third-party unit-price feed endpoint (UDI quote page).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_feed_url: Option<String>,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Config {
    /// Build a Config from environment variables. Only the store URL and
    /// anon key are required; everything else has a default or is optional.
    pub fn from_env() -> Result<Self, String> {
        let store_url = std::env::var("CRM_STORE_URL")
            .map_err(|_| "CRM_STORE_URL is not set".to_string())?;
        let anon_key = std::env::var("CRM_ANON_KEY")
            .map_err(|_| "CRM_ANON_KEY is not set".to_string())?;
        Ok(Config {
            store_url,
            anon_key,
            service_role_key: std::env::var("CRM_SERVICE_ROLE_KEY").ok(),
            admin_bootstrap_secret: std::env::var("CRM_ADMIN_BOOTSTRAP_SECRET").ok(),
            bind_addr: std::env::var("CRM_BIND_ADDR").unwrap_or_else(|_| default_bind_addr()),
            request_timeout_secs: std::env::var("CRM_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_request_timeout_secs),
            rate_feed_url: std::env::var("CRM_RATE_FEED_URL").ok(),
        })
    }
}

// =============================================================================
// Users and hierarchy
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Advisor,
    Manager,
    Promoter,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Advisor => "advisor",
            Role::Manager => "manager",
            Role::Promoter => "promoter",
            Role::Admin => "admin",
        }
    }
}

/// A user profile. Hierarchy back-references point upward: an advisor's
/// `manager_id` names the manager they report to, and `promoter_id` the
/// promoter that chain ultimately reaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// =============================================================================
// Clients (prospects/customers)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Prospect,
    Interested,
    Client,
    Inactive,
    Referred,
    NotInterested,
}

/// Coarse Kanban bucket, independent of the finer status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    New,
    Quote,
    Follow,
    Issued,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    /// Absent owner means the record is orphaned (owner deleted or never
    /// assigned); tolerated so it can be manually reassigned later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    pub status: ClientStatus,
    pub stage: PipelineStage,
    /// Whether first contact happened. `contactado_fecha` is non-null iff
    /// this is true; the row mapper enforces that at the wire boundary.
    pub contactado: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contactado_fecha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// =============================================================================
// Policies
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Proposal,
    InProcess,
    Active,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Mxn,
    Usd,
    Udi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl PaymentFrequency {
    /// Number of payment periods in a year.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Semiannual => 2,
            PaymentFrequency::Annual => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// The client this policy belongs to. Deleting a client does not cascade;
    /// a dangling reference here is tolerated.
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub status: PolicyStatus,
    pub currency: Currency,
    pub premium: f64,
    pub payment_frequency: PaymentFrequency,
    /// Date the policy entered the funnel; drives the dashboard count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// =============================================================================
// Activities (calendar events)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Call,
    InitialMeeting,
    ClosingMeeting,
    Delivery,
    FollowUp,
}

impl ActivityType {
    /// Fixed per-type score used by the dashboard's daily points total.
    pub fn points(&self) -> u32 {
        match self {
            ActivityType::Call => 1,
            ActivityType::InitialMeeting => 3,
            ActivityType::ClosingMeeting => 5,
            ActivityType::Delivery => 8,
            ActivityType::FollowUp => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub activity_type: ActivityType,
    /// ISO-8601 start/end. End must be after start; the row mapper corrects
    /// a non-conforming end to start + 1h.
    pub start: String,
    pub end: String,
    pub completed: bool,
    /// Whether this activity produced a close.
    pub generated_close: bool,
    /// Other user ids this activity is shared with.
    #[serde(default)]
    pub shared_with: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// =============================================================================
// Goals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalMetric {
    Income,
    PolicyCount,
    Appointments,
    Referrals,
}

/// A per-owner, per-month target for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub metric: GoalMetric,
    /// Target month as "YYYY-MM".
    pub month: String,
    pub target: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// =============================================================================
// Knowledge base
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KbSection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// File metadata only; binary content lives behind an opaque storage path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KbFile {
    pub id: String,
    pub section_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}

// =============================================================================
// Medical forms
// =============================================================================

/// A per-client medical questionnaire snapshot, filed by the owning advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalForm {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub client_id: String,
    /// Questionnaire answers, kept as the submitted JSON snapshot.
    pub answers: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Generate a fresh entity id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
