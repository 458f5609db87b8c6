//! Tests for the registry client
//!
//! Drives the client against scripted transports on a paused tokio clock.

pub mod client_tests;

use super::transport::{RegistryResponse, RegistryTransport, TransportError};
use crate::identifier::Cnpj;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type Reply = Result<RegistryResponse, TransportError>;

/// Transport that replays canned replies per identifier
///
/// Each identifier has a queue; the last reply repeats once the queue is
/// down to one entry. Unknown identifiers get a 404.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: AtomicUsize,
    call_log: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, cnpj: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(cnpj.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn ok(self, cnpj: &str, body: &str) -> Self {
        self.reply(cnpj, Ok(RegistryResponse::new(200, body)))
    }

    pub(crate) fn status(self, cnpj: &str, status: u16) -> Self {
        self.reply(cnpj, Ok(RegistryResponse::new(status, "")))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn call_log(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryTransport for ScriptedTransport {
    async fn fetch(&self, cnpj: &Cnpj) -> Result<RegistryResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_log.lock().unwrap().push(cnpj.to_string());

        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(cnpj.as_str()) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => Ok(RegistryResponse::new(404, r#"{"message":"not found"}"#)),
        }
    }
}

/// Minimal successful registry body
pub(crate) fn company_body(cnpj: &str, name: &str) -> String {
    format!(
        r#"{{
            "cnpj": "{cnpj}",
            "razao_social": "{name}",
            "nome_fantasia": "",
            "cnae_fiscal": 6201501,
            "cnae_fiscal_descricao": "Desenvolvimento de programas de computador sob encomenda",
            "cnaes_secundarios": [{{"codigo": 6204000, "descricao": "Consultoria em tecnologia da informação"}}],
            "logradouro": "RUA A",
            "numero": "1",
            "complemento": "",
            "bairro": "CENTRO",
            "municipio": "CURITIBA",
            "uf": "PR",
            "cep": "80010000",
            "porte": "MICRO EMPRESA",
            "capital_social": 10000,
            "descricao_situacao_cadastral": "ATIVA",
            "data_situacao_cadastral": "2010-01-15",
            "ddd_telefone_1": "4133334444",
            "ddd_telefone_2": "",
            "email": "contato@example.com"
        }}"#
    )
}
