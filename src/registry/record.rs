//! Registry record as returned by the CNPJ lookup endpoint.
//!
//! The wire payload is deserialized into [`RegistryPayload`] and then folded
//! into [`RegistryRecord`]. The main activity and the secondary ones are
//! kept apart, so a missing main activity never promotes a secondary one.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One CNAE activity code with its description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub code: String,
    pub description: String,
}

impl Activity {
    fn is_placeholder(&self) -> bool {
        self.code.is_empty() || self.code.chars().all(|c| c == '0')
    }
}

/// Address parts as separate fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub complement: String,
    pub district: String,
    pub municipality: String,
    pub state: String,
    pub postal_code: String,
}

/// Structured registry data for one company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RegistryPayload")]
pub struct RegistryRecord {
    pub cnpj: String,
    pub legal_name: String,
    pub trade_name: String,
    pub main_activity: Option<Activity>,
    /// Secondary activities in registry order
    pub secondary_activities: Vec<Activity>,
    pub address: Address,
    pub size: String,
    pub share_capital: Option<f64>,
    pub status: String,
    pub status_date: String,
    pub phones: Vec<String>,
    pub email: String,
}

impl RegistryRecord {
    /// Parse a response body
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    pub fn primary_activity(&self) -> Option<&Activity> {
        self.main_activity.as_ref()
    }

    /// First secondary activity, in registry order
    pub fn secondary_activity(&self) -> Option<&Activity> {
        self.secondary_activities.first()
    }
}

#[derive(Debug, Deserialize)]
struct ActivityPayload {
    #[serde(default, deserialize_with = "text_or_number")]
    codigo: String,
    #[serde(default, deserialize_with = "text_or_number")]
    descricao: String,
}

/// Wire format of the lookup response; only the fields the report uses
#[derive(Debug, Deserialize)]
struct RegistryPayload {
    #[serde(default, deserialize_with = "text_or_number")]
    cnpj: String,
    #[serde(default, deserialize_with = "text_or_number")]
    razao_social: String,
    #[serde(default, deserialize_with = "text_or_number")]
    nome_fantasia: String,
    #[serde(default, deserialize_with = "text_or_number")]
    cnae_fiscal: String,
    #[serde(default, deserialize_with = "text_or_number")]
    cnae_fiscal_descricao: String,
    #[serde(default, deserialize_with = "activity_list")]
    cnaes_secundarios: Vec<ActivityPayload>,
    #[serde(default, deserialize_with = "text_or_number")]
    logradouro: String,
    #[serde(default, deserialize_with = "text_or_number")]
    numero: String,
    #[serde(default, deserialize_with = "text_or_number")]
    complemento: String,
    #[serde(default, deserialize_with = "text_or_number")]
    bairro: String,
    #[serde(default, deserialize_with = "text_or_number")]
    municipio: String,
    #[serde(default, deserialize_with = "text_or_number")]
    uf: String,
    #[serde(default, deserialize_with = "text_or_number")]
    cep: String,
    #[serde(default, deserialize_with = "text_or_number")]
    porte: String,
    #[serde(default, deserialize_with = "decimal")]
    capital_social: Option<f64>,
    #[serde(default, deserialize_with = "text_or_number")]
    descricao_situacao_cadastral: String,
    #[serde(default, deserialize_with = "text_or_number")]
    situacao_cadastral: String,
    #[serde(default, deserialize_with = "text_or_number")]
    data_situacao_cadastral: String,
    #[serde(default, deserialize_with = "text_or_number")]
    ddd_telefone_1: String,
    #[serde(default, deserialize_with = "text_or_number")]
    ddd_telefone_2: String,
    #[serde(default, deserialize_with = "text_or_number")]
    email: String,
}

impl From<RegistryPayload> for RegistryRecord {
    fn from(payload: RegistryPayload) -> Self {
        let main_activity = Some(Activity {
            code: payload.cnae_fiscal,
            description: payload.cnae_fiscal_descricao,
        })
        .filter(|a| !a.is_placeholder());

        let secondary_activities = payload
            .cnaes_secundarios
            .into_iter()
            .map(|a| Activity {
                code: a.codigo,
                description: a.descricao,
            })
            .filter(|a| !a.is_placeholder())
            .collect();

        let status = if payload.descricao_situacao_cadastral.is_empty() {
            payload.situacao_cadastral
        } else {
            payload.descricao_situacao_cadastral
        };

        let phones = [payload.ddd_telefone_1, payload.ddd_telefone_2]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();

        RegistryRecord {
            cnpj: payload.cnpj,
            legal_name: payload.razao_social,
            trade_name: payload.nome_fantasia,
            main_activity,
            secondary_activities,
            address: Address {
                street: payload.logradouro,
                number: payload.numero,
                complement: payload.complemento,
                district: payload.bairro,
                municipality: payload.municipio,
                state: payload.uf,
                postal_code: payload.cep,
            },
            size: payload.porte,
            share_capital: payload.capital_social,
            status,
            status_date: payload.data_situacao_cadastral,
            phones,
            email: payload.email,
        }
    }
}

/// Accept strings, numbers or null; everything ends up as trimmed text
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    })
}

fn decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    })
}

fn activity_list<'de, D>(deserializer: D) -> Result<Vec<ActivityPayload>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ActivityPayload>>::deserialize(deserializer)?.unwrap_or_default())
}
