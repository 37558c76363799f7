//! Mock bank SOAP server for testing
//!
//! Simulates the remote bank service over plain HTTP so the client can be
//! exercised end to end without a real server. It keeps an in-memory list
//! of accounts:
//! - `getComptes` returns every stored account
//! - `createCompte` appends an account with the next id and a fixed creation date
//! - `deleteCompte` removes the account and answers whether it existed

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// One stored account, in wire form
#[derive(Debug, Clone)]
pub struct MockAccount {
    pub id: i64,
    pub solde: String,
    pub date_creation: String,
    pub account_type: String,
}

impl MockAccount {
    pub fn new(id: i64, solde: &str, date_creation: &str, account_type: &str) -> Self {
        Self {
            id,
            solde: solde.to_string(),
            date_creation: date_creation.to_string(),
            account_type: account_type.to_string(),
        }
    }
}

/// Configuration for the mock server
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Accounts present at startup
    pub accounts: Vec<MockAccount>,
    /// Answer every call with this SOAP fault string (HTTP 500)
    pub fault: Option<String>,
    /// Answer `getComptes` with this raw response body instead of the stored accounts
    pub raw_list_items: Option<String>,
    /// Answer `deleteCompte` with this raw return value
    pub raw_delete_return: Option<String>,
    /// Answer every call with this HTTP status and an empty body
    pub http_status: Option<u16>,
}

#[derive(Debug, Default)]
struct MockBank {
    accounts: Vec<MockAccount>,
    next_id: i64,
    requests: Vec<String>,
    heads: Vec<String>,
}

/// Mock bank server for testing
pub struct MockBankServer {
    port: u16,
    running: Arc<AtomicBool>,
    bank: Arc<Mutex<MockBank>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockBankServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let next_id = config.accounts.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let bank = Arc::new(Mutex::new(MockBank {
            accounts: config.accounts.clone(),
            next_id,
            requests: Vec::new(),
            heads: Vec::new(),
        }));
        let bank_clone = bank.clone();

        // Non-blocking accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let bank = bank_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &bank);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            bank,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the endpoint URL for this mock server
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}/BanqueService", self.port)
    }

    /// Raw request bodies received so far
    pub fn requests(&self) -> Vec<String> {
        self.bank.lock().unwrap().requests.clone()
    }

    /// Request line and headers of each request, as sent
    pub fn request_heads(&self) -> Vec<String> {
        self.bank.lock().unwrap().heads.clone()
    }

    /// Number of accounts currently stored
    pub fn account_count(&self) -> usize {
        self.bank.lock().unwrap().accounts.len()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBankServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read one HTTP request and return its head and body
fn read_request(stream: &mut TcpStream) -> Option<(String, String)> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
    let content_length = head
        .to_lowercase()
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body = String::from_utf8_lossy(&data[header_end..]).into_owned();
    Some((head, body))
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, bank: &Mutex<MockBank>) {
    // Accepted sockets may inherit non-blocking mode from the listener
    let _ = stream.set_nonblocking(false);

    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };
    {
        let mut bank = bank.lock().unwrap();
        bank.heads.push(head);
        bank.requests.push(body.clone());
    }

    if let Some(status) = config.http_status {
        send_response(&mut stream, status, "");
        return;
    }

    if let Some(fault) = &config.fault {
        let xml = envelope(&format!(
            "<S:Fault><faultcode>S:Server</faultcode><faultstring>{}</faultstring></S:Fault>",
            fault
        ));
        send_response(&mut stream, 500, &xml);
        return;
    }

    let reply = if body.contains("getComptes") {
        let items = match &config.raw_list_items {
            Some(raw) => raw.clone(),
            None => bank
                .lock()
                .unwrap()
                .accounts
                .iter()
                .map(|a| {
                    format!(
                        "<return><dateCreation>{}</dateCreation><id>{}</id><solde>{}</solde><type>{}</type></return>",
                        a.date_creation, a.id, a.solde, a.account_type
                    )
                })
                .collect(),
        };
        response_element("getComptesResponse", &items)
    } else if body.contains("createCompte") {
        let solde = extract_tag(&body, "solde").unwrap_or_default();
        let account_type = extract_tag(&body, "type").unwrap_or_default();
        let mut bank = bank.lock().unwrap();
        let id = bank.next_id;
        bank.next_id += 1;
        bank.accounts
            .push(MockAccount::new(id, &solde, "2024-05-01T09:15:00+02:00", &account_type));
        response_element("createCompteResponse", "")
    } else if body.contains("deleteCompte") {
        let value = match &config.raw_delete_return {
            Some(raw) => raw.clone(),
            None => {
                let id = extract_tag(&body, "id").and_then(|v| v.parse::<i64>().ok());
                let mut bank = bank.lock().unwrap();
                let before = bank.accounts.len();
                bank.accounts.retain(|a| Some(a.id) != id);
                (bank.accounts.len() < before).to_string()
            }
        };
        response_element("deleteCompteResponse", &format!("<return>{}</return>", value))
    } else {
        let xml = envelope(
            "<S:Fault><faultcode>S:Client</faultcode><faultstring>Cannot find dispatch method</faultstring></S:Fault>",
        );
        send_response(&mut stream, 500, &xml);
        return;
    };

    send_response(&mut stream, 200, &reply);
}

/// Text content of the first `<tag ...>...</tag>` in `xml`
fn extract_tag(xml: &str, tag: &str) -> Option<String> {
    let open = xml.find(&format!("<{}", tag))?;
    let content_start = open + xml[open..].find('>')? + 1;
    let content_end = content_start + xml[content_start..].find(&format!("</{}>", tag))?;
    Some(xml[content_start..content_end].trim().to_string())
}

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" ?><S:Envelope xmlns:S="http://schemas.xmlsoap.org/soap/envelope/"><S:Body>{}</S:Body></S:Envelope>"#,
        body
    )
}

fn response_element(name: &str, content: &str) -> String {
    envelope(&format!(
        r#"<ns2:{name} xmlns:ns2="http://ws/">{content}</ns2:{name}>"#,
        name = name,
        content = content
    ))
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::adapters::remote::RemoteAccountClient;
    use crate::config::Endpoint;
    use crate::domain::result::ErrorKind;
    use crate::domain::AccountType;
    use crate::ports::{AccountGateway, FixedClock};
    use crate::services::AccountService;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2031, 1, 2).unwrap()
    }

    fn client_for(server: &MockBankServer) -> RemoteAccountClient {
        RemoteAccountClient::with_clock(
            &Endpoint::new(server.url(), "http://ws/"),
            Arc::new(FixedClock(fixed_today())),
        )
        .unwrap()
    }

    fn seeded() -> MockConfig {
        MockConfig {
            accounts: vec![
                MockAccount::new(1, "1200.5", "2024-01-10", "COURANT"),
                MockAccount::new(2, "0.0", "2024-01-11", "EPARGNE"),
                MockAccount::new(3, "1.0E7", "2024-01-12T00:00:00+01:00", "EPARGNE"),
            ],
            ..Default::default()
        }
    }

    /// Value of header `name` in a raw request head, matched case-insensitively
    fn header_value(head: &str, name: &str) -> Option<String> {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    /// Endpoint on a port nobody listens on
    fn unreachable_endpoint() -> Endpoint {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        Endpoint::new(format!("http://127.0.0.1:{}/BanqueService", port), "http://ws/")
    }

    #[test]
    fn test_list_returns_every_element_in_order() {
        let server = MockBankServer::start(seeded()).unwrap();
        let accounts = client_for(&server).list_accounts().unwrap();

        assert_eq!(accounts.len(), 3);
        let ids: Vec<_> = accounts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(accounts[0].balance, Decimal::new(12005, 1));
        assert_eq!(accounts[0].account_type, AccountType::Checking);
        assert_eq!(accounts[2].balance, Decimal::new(10_000_000, 0));
        assert_eq!(accounts[2].created_at, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
    }

    #[test]
    fn test_list_request_envelope() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        assert!(client_for(&server).list_accounts().unwrap().is_empty());

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].contains(r#"<n0:getComptes xmlns:n0="http://ws/">"#));
        assert!(requests[0].contains("http://schemas.xmlsoap.org/soap/envelope/"));
    }

    #[test]
    fn test_list_fallbacks_use_fixed_clock() {
        let server = MockBankServer::start(MockConfig {
            raw_list_items: Some(
                "<return><id>x</id><solde>abc</solde><type>COURANT</type></return>".to_string(),
            ),
            ..Default::default()
        })
        .unwrap();

        let accounts = client_for(&server).list_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, None);
        assert_eq!(accounts[0].balance, Decimal::ZERO);
        assert_eq!(accounts[0].created_at, fixed_today());
    }

    #[test]
    fn test_list_unknown_type_is_protocol_error() {
        let server = MockBankServer::start(MockConfig {
            raw_list_items: Some(
                "<return><id>1</id><solde>5</solde><type>COURANT</type></return>\
                 <return><id>2</id><solde>5</solde><type>PEL</type></return>"
                    .to_string(),
            ),
            ..Default::default()
        })
        .unwrap();

        let err = client_for(&server).list_accounts().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.field(), Some("type"));
        assert!(err.to_string().contains("element 1"));
    }

    #[test]
    fn test_create_sends_wire_names() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        client_for(&server)
            .create_account(Decimal::new(100, 0), AccountType::Savings)
            .unwrap();

        let requests = server.requests();
        assert!(requests[0].contains(r#"<solde i:type="d:double">100</solde>"#));
        assert!(requests[0].contains(r#"<type i:type="d:string">EPARGNE</type>"#));
        assert_eq!(server.account_count(), 1);

        let head = &server.request_heads()[0];
        assert!(head.starts_with("POST /BanqueService "));
        assert_eq!(
            header_value(head, "SOAPAction").as_deref(),
            Some(r#""http://ws/createCompte""#)
        );
        assert_eq!(
            header_value(head, "Content-Type").as_deref(),
            Some("text/xml; charset=utf-8")
        );
    }

    #[test]
    fn test_create_then_list_round_trip() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server);

        client.create_account(Decimal::new(25050, 2), AccountType::Checking).unwrap();
        let accounts = client.list_accounts().unwrap();

        assert_eq!(accounts.len(), 1);
        assert!(accounts[0].id.is_some());
        assert_eq!(accounts[0].balance, Decimal::new(25050, 2));
        assert_eq!(accounts[0].account_type, AccountType::Checking);
        assert_eq!(accounts[0].created_at, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_delete_twice_reports_true_then_false() {
        let server = MockBankServer::start(seeded()).unwrap();
        let client = client_for(&server);

        assert!(client.delete_account(2).unwrap());
        assert!(!client.delete_account(2).unwrap());
        assert_eq!(server.account_count(), 2);
        assert!(server.requests()[0].contains(r#"<id i:type="d:long">2</id>"#));

        for head in server.request_heads() {
            assert_eq!(
                header_value(&head, "SOAPAction").as_deref(),
                Some(r#""http://ws/deleteCompte""#)
            );
            assert_eq!(
                header_value(&head, "Content-Type").as_deref(),
                Some("text/xml; charset=utf-8")
            );
        }
    }

    #[test]
    fn test_delete_non_boolean_reply_is_protocol_error() {
        let server = MockBankServer::start(MockConfig {
            raw_delete_return: Some("deleted".to_string()),
            ..Default::default()
        })
        .unwrap();

        let err = client_for(&server).delete_account(1).unwrap_err();
        assert_eq!(err.field(), Some("return"));
    }

    #[test]
    fn test_fault_is_domain_error() {
        let server = MockBankServer::start(MockConfig {
            fault: Some("Compte 42 introuvable".to_string()),
            ..Default::default()
        })
        .unwrap();

        let err = client_for(&server).delete_account(42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert!(err.to_string().contains("Compte 42 introuvable"));
    }

    #[test]
    fn test_unexpected_status_is_protocol_error() {
        let server = MockBankServer::start(MockConfig {
            http_status: Some(503),
            ..Default::default()
        })
        .unwrap();

        let err = client_for(&server).list_accounts().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.field(), Some("http"));
    }

    #[test]
    fn test_unreachable_server_is_connectivity_error() {
        let client = RemoteAccountClient::new(&unreachable_endpoint()).unwrap();

        assert_eq!(client.list_accounts().unwrap_err().kind(), ErrorKind::Connectivity);
        assert_eq!(
            client
                .create_account(Decimal::new(100, 0), AccountType::Savings)
                .unwrap_err()
                .kind(),
            ErrorKind::Connectivity
        );
    }

    #[test]
    fn test_lenient_boundary_against_mock() {
        let server = MockBankServer::start(seeded()).unwrap();
        let service = AccountService::new(Arc::new(client_for(&server)));

        assert!(service.try_create_account(Decimal::new(100, 0), AccountType::Savings));
        assert_eq!(service.list_accounts_or_empty().len(), 4);
        assert!(!service.try_delete_account(42));
        assert!(service.try_delete_account(1));

        let offline = AccountService::new(Arc::new(
            RemoteAccountClient::new(&unreachable_endpoint()).unwrap(),
        ));
        assert!(!offline.try_create_account(Decimal::new(100, 0), AccountType::Savings));
        assert!(!offline.try_delete_account(1));
        assert!(offline.list_accounts_or_empty().is_empty());
    }
}
