//! Wire row shapes and entity ↔ row mappers.
//!
//! The store speaks snake_case rows with explicitly nullable columns; the
//! domain speaks camelCase entities with `Option` fields. One mapper per
//! entity, pure and total: a missing optional column becomes `None`, an
//! absent entity field becomes `null` on the wire. This module is the only
//! place the two nullability conventions meet.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{
    Activity, ActivityType, Client, ClientStatus, Currency, Goal, GoalMetric, KbFile, KbSection,
    MedicalForm, PaymentFrequency, PipelineStage, Policy, PolicyStatus, Profile, Role,
};
use crate::util::parse_timestamp;

/// An entity with a wire row representation and a home table.
///
/// `to_row`/`from_row` are inverse up to normalization: every defined field
/// survives the round trip, and the contacted/window derivations below are
/// the only places a value is rewritten.
pub trait Mapped: Sized {
    type Row: Serialize + DeserializeOwned + Send;
    const TABLE: &'static str;
    /// Server-side ordering for list fetches.
    const ORDER: &'static str;

    fn id(&self) -> &str;
    fn to_row(&self) -> Self::Row;
    fn from_row(row: Self::Row) -> Self;
}

// =============================================================================
// Boundary derivations
// =============================================================================

/// Derive the contacted timestamp column from the contacted flag.
///
/// When the flag is true, any existing date-like value is coerced to
/// ISO-8601, defaulting to `now` when absent; when false, the column is
/// forced null regardless of input. This is where the flag/date invariant
/// is enforced, not a passthrough.
pub fn derive_contactado_fecha(
    contactado: bool,
    existing: Option<&str>,
    now: DateTime<Utc>,
) -> Option<String> {
    if !contactado {
        return None;
    }
    match existing {
        Some(value) => Some(
            parse_timestamp(value)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| now.to_rfc3339()),
        ),
        None => Some(now.to_rfc3339()),
    }
}

/// Correct an activity end time that is not after its start.
///
/// Returns the end to store: the given end when it parses and follows the
/// start, otherwise start + 1h. An unparsable start leaves the end alone.
pub fn corrected_end(start: &str, end: &str) -> String {
    let Some(start_dt) = parse_timestamp(start) else {
        return end.to_string();
    };
    match parse_timestamp(end) {
        Some(end_dt) if end_dt > start_dt => end.to_string(),
        _ => (start_dt + Duration::hours(1)).to_rfc3339(),
    }
}

// =============================================================================
// Profiles
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub promoter_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Mapped for Profile {
    type Row = ProfileRow;
    const TABLE: &'static str = "profiles";
    const ORDER: &'static str = "created_at.desc";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> ProfileRow {
        ProfileRow {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            name: Some(self.name.clone()),
            username: self.username.clone(),
            role: Some(self.role),
            manager_id: self.manager_id.clone(),
            promoter_id: self.promoter_id.clone(),
            created_at: self.created_at.clone(),
        }
    }

    fn from_row(row: ProfileRow) -> Profile {
        Profile {
            id: row.id,
            email: row.email.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            username: row.username,
            role: row.role.unwrap_or(Role::Advisor),
            manager_id: row.manager_id,
            promoter_id: row.promoter_id,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Clients
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRow {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub status: Option<ClientStatus>,
    #[serde(default)]
    pub stage: Option<PipelineStage>,
    #[serde(default)]
    pub contactado: Option<bool>,
    #[serde(default)]
    pub contactado_fecha: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Mapped for Client {
    type Row = ClientRow;
    const TABLE: &'static str = "clients";
    const ORDER: &'static str = "created_at.desc";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> ClientRow {
        ClientRow {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            name: Some(self.name.clone()),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            birth_date: self.birth_date.clone(),
            occupation: self.occupation.clone(),
            status: Some(self.status),
            stage: Some(self.stage),
            contactado: Some(self.contactado),
            contactado_fecha: derive_contactado_fecha(
                self.contactado,
                self.contactado_fecha.as_deref(),
                Utc::now(),
            ),
            notes: self.notes.clone(),
            created_at: self.created_at.clone(),
        }
    }

    fn from_row(row: ClientRow) -> Client {
        let contactado = row.contactado.unwrap_or(false);
        Client {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name.unwrap_or_default(),
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            birth_date: row.birth_date,
            occupation: row.occupation,
            status: row.status.unwrap_or(ClientStatus::Prospect),
            stage: row.stage.unwrap_or(PipelineStage::New),
            contactado,
            // The invariant also holds on the way in: a stale date on an
            // un-contacted row is dropped rather than resurrected.
            contactado_fecha: if contactado { row.contactado_fecha } else { None },
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Policies
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRow {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub insurer: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub status: Option<PolicyStatus>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub premium: Option<f64>,
    #[serde(default)]
    pub payment_frequency: Option<PaymentFrequency>,
    #[serde(default)]
    pub intake_date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub next_payment_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Mapped for Policy {
    type Row = PolicyRow;
    const TABLE: &'static str = "policies";
    const ORDER: &'static str = "intake_date.desc";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> PolicyRow {
        PolicyRow {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            client_id: Some(self.client_id.clone()),
            policy_number: self.policy_number.clone(),
            insurer: self.insurer.clone(),
            product: self.product.clone(),
            status: Some(self.status),
            currency: Some(self.currency),
            premium: Some(self.premium),
            payment_frequency: Some(self.payment_frequency),
            intake_date: self.intake_date.clone(),
            start_date: self.start_date.clone(),
            next_payment_date: self.next_payment_date.clone(),
            created_at: self.created_at.clone(),
        }
    }

    fn from_row(row: PolicyRow) -> Policy {
        Policy {
            id: row.id,
            owner_id: row.owner_id,
            client_id: row.client_id.unwrap_or_default(),
            policy_number: row.policy_number,
            insurer: row.insurer,
            product: row.product,
            status: row.status.unwrap_or(PolicyStatus::Proposal),
            currency: row.currency.unwrap_or(Currency::Mxn),
            premium: row.premium.unwrap_or(0.0),
            payment_frequency: row.payment_frequency.unwrap_or(PaymentFrequency::Annual),
            intake_date: row.intake_date,
            start_date: row.start_date,
            next_payment_date: row.next_payment_date,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Activities
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRow {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub activity_type: Option<ActivityType>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub generated_close: Option<bool>,
    #[serde(default)]
    pub shared_with: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Mapped for Activity {
    type Row = ActivityRow;
    const TABLE: &'static str = "activities";
    const ORDER: &'static str = "start.desc";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> ActivityRow {
        ActivityRow {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            client_id: self.client_id.clone(),
            activity_type: Some(self.activity_type),
            start: Some(self.start.clone()),
            end: Some(corrected_end(&self.start, &self.end)),
            completed: Some(self.completed),
            generated_close: Some(self.generated_close),
            shared_with: Some(self.shared_with.clone()),
            notes: self.notes.clone(),
            created_at: self.created_at.clone(),
        }
    }

    fn from_row(row: ActivityRow) -> Activity {
        Activity {
            id: row.id,
            owner_id: row.owner_id,
            client_id: row.client_id,
            activity_type: row.activity_type.unwrap_or(ActivityType::Call),
            start: row.start.unwrap_or_default(),
            end: row.end.unwrap_or_default(),
            completed: row.completed.unwrap_or(false),
            generated_close: row.generated_close.unwrap_or(false),
            shared_with: row.shared_with.unwrap_or_default(),
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Goals
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalRow {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub metric: Option<GoalMetric>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Mapped for Goal {
    type Row = GoalRow;
    const TABLE: &'static str = "goals";
    const ORDER: &'static str = "month.desc";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> GoalRow {
        GoalRow {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            metric: Some(self.metric),
            month: Some(self.month.clone()),
            target: Some(self.target),
            created_at: self.created_at.clone(),
        }
    }

    fn from_row(row: GoalRow) -> Goal {
        Goal {
            id: row.id,
            owner_id: row.owner_id,
            metric: row.metric.unwrap_or(GoalMetric::Income),
            month: row.month.unwrap_or_default(),
            target: row.target.unwrap_or(0.0),
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Knowledge base
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbSectionRow {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Mapped for KbSection {
    type Row = KbSectionRow;
    const TABLE: &'static str = "kb_sections";
    const ORDER: &'static str = "created_at.desc";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> KbSectionRow {
        KbSectionRow {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            name: Some(self.name.clone()),
            description: self.description.clone(),
            created_at: self.created_at.clone(),
        }
    }

    fn from_row(row: KbSectionRow) -> KbSection {
        KbSection {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name.unwrap_or_default(),
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbFileRow {
    pub id: String,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<i64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

impl Mapped for KbFile {
    type Row = KbFileRow;
    const TABLE: &'static str = "kb_files";
    const ORDER: &'static str = "uploaded_at.desc";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> KbFileRow {
        KbFileRow {
            id: self.id.clone(),
            section_id: Some(self.section_id.clone()),
            name: Some(self.name.clone()),
            storage_path: self.storage_path.clone(),
            url: self.url.clone(),
            size_bytes: self.size_bytes,
            mime_type: self.mime_type.clone(),
            uploaded_at: self.uploaded_at.clone(),
        }
    }

    fn from_row(row: KbFileRow) -> KbFile {
        KbFile {
            id: row.id,
            section_id: row.section_id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            storage_path: row.storage_path,
            url: row.url,
            size_bytes: row.size_bytes,
            mime_type: row.mime_type,
            uploaded_at: row.uploaded_at,
        }
    }
}

// =============================================================================
// Medical forms
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalFormRow {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub answers: Option<serde_json::Value>,
    #[serde(default)]
    pub filed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Mapped for MedicalForm {
    type Row = MedicalFormRow;
    const TABLE: &'static str = "medical_forms";
    const ORDER: &'static str = "created_at.desc";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> MedicalFormRow {
        MedicalFormRow {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            client_id: Some(self.client_id.clone()),
            answers: Some(self.answers.clone()),
            filed_at: self.filed_at.clone(),
            created_at: self.created_at.clone(),
        }
    }

    fn from_row(row: MedicalFormRow) -> MedicalForm {
        MedicalForm {
            id: row.id,
            owner_id: row.owner_id,
            client_id: row.client_id.unwrap_or_default(),
            answers: row.answers.unwrap_or(serde_json::Value::Null),
            filed_at: row.filed_at,
            created_at: row.created_at,
        }
    }
}
