use crate::service::transfer::{ZoneTransfer, TRANSFER_LIMIT};
use async_trait::async_trait;
use futures_util::StreamExt;
use hickory_proto::error::ProtoError;
use hickory_proto::iocompat::AsyncIoTokioAsStd;
use hickory_proto::op::{Message, MessageType, NoopMessageFinalizer, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, Record, RecordType};
use hickory_proto::tcp::TcpClientStream;
use hickory_proto::xfer::{DnsExchange, DnsHandle, DnsMultiplexer, DnsRequest, DnsRequestOptions};
use hickory_proto::TokioTime;
use hickory_resolver::TokioAsyncResolver;
use log::{debug, warn};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream as TokioTcpStream;
use tokio::time;

const DNS_PORT: u16 = 53;

/// Failures are written the way dig prints them, so the classifier treats
/// both transports alike.
#[derive(Error, Debug)]
enum TransferFailure {
    #[error("; Transfer failed.")]
    Rejected,
    #[error(";; communications error to {0}: {1}")]
    Communications(SocketAddr, ProtoError),
    #[error(";; connection timed out; no servers could be reached")]
    TimedOut,
    /// Records received before the server went quiet, followed by the timeout line.
    #[error("{0};; connection timed out; no servers could be reached")]
    Stalled(String),
}

pub struct NativeTransfer {
    resolver: TokioAsyncResolver,
}

impl NativeTransfer {
    pub fn new(resolver: TokioAsyncResolver) -> Self {
        Self { resolver }
    }

    async fn address_of(&self, nameserver: &str) -> Option<IpAddr> {
        match self.resolver.lookup_ip(nameserver).await {
            Ok(lookup) => lookup.iter().next(),
            Err(e) => {
                warn!("Unable to find an address for {}: {}", nameserver, e);
                None
            }
        }
    }
}

#[async_trait]
impl ZoneTransfer for NativeTransfer {
    async fn probe(&self, domain: &str, nameserver: &str, timeout: Duration) -> String {
        let Some(ip) = self.address_of(nameserver).await else {
            return String::new();
        };
        debug!("AXFR {} @{} ({})", domain, nameserver, ip);
        axfr(SocketAddr::new(ip, DNS_PORT), domain, timeout).await
    }
}

/// `timeout` bounds the connect and every wait for the next message.
pub(crate) async fn axfr(addr: SocketAddr, domain: &str, timeout: Duration) -> String {
    match transfer(addr, domain, timeout).await {
        Ok(zone) => zone,
        Err(failure) => format!("{}\n", failure),
    }
}

async fn transfer(addr: SocketAddr, domain: &str, timeout: Duration) -> Result<String, TransferFailure> {
    let origin = Name::from_ascii(domain).map_err(|_| TransferFailure::Rejected)?;
    let (stream, handle) =
        TcpClientStream::<AsyncIoTokioAsStd<TokioTcpStream>>::with_timeout(addr, timeout);
    let multiplexer =
        DnsMultiplexer::with_timeout(stream, handle, TRANSFER_LIMIT, NoopMessageFinalizer::new());
    let (exchange, background) =
        match time::timeout(timeout, DnsExchange::connect::<_, _, TokioTime>(multiplexer)).await {
            Ok(connected) => connected.map_err(|e| TransferFailure::Communications(addr, e))?,
            Err(_) => return Err(TransferFailure::TimedOut),
        };
    let background = tokio::spawn(background);
    let result = collect_zone(&exchange, addr, origin, timeout).await;
    background.abort();
    result
}

/// Reads answer records up to and excluding the closing SOA.
async fn collect_zone(
    exchange: &DnsExchange,
    addr: SocketAddr,
    origin: Name,
    idle: Duration,
) -> Result<String, TransferFailure> {
    let mut message = Message::new();
    message
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false);
    message.add_query(Query::query(origin, RecordType::AXFR));
    let mut responses = exchange.send(DnsRequest::new(message, DnsRequestOptions::default()));
    let mut records: Vec<Record> = Vec::new();
    loop {
        let response = match time::timeout(idle, responses.next()).await {
            Ok(Some(response)) => response.map_err(|e| TransferFailure::Communications(addr, e))?,
            Ok(None) => break,
            Err(_) if records.is_empty() => return Err(TransferFailure::TimedOut),
            Err(_) => return Err(TransferFailure::Stalled(render(&records))),
        };
        if response.response_code() != ResponseCode::NoError || response.answers().is_empty() {
            return Err(TransferFailure::Rejected);
        }
        for record in response.answers() {
            let is_soa = record.record_type() == RecordType::SOA;
            if records.is_empty() && !is_soa {
                return Err(TransferFailure::Rejected);
            }
            if is_soa && !records.is_empty() {
                return Ok(render(&records));
            }
            records.push(record.clone());
        }
    }
    if records.is_empty() {
        Err(TransferFailure::Rejected)
    } else {
        Err(TransferFailure::Communications(addr, ProtoError::from("end of file")))
    }
}

fn render(records: &[Record]) -> String {
    records.iter().map(|record| format!("{}\n", record)).collect()
}
