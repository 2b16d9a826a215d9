//! Secure channel bootstrap.
//!
//! ChirpStack deployments commonly run with a private or self-signed
//! certificate and no CA bundle is configured, so trust is taken from the
//! server itself:
//!
//! 1. A throwaway TLS handshake with verification disabled harvests the
//!    certificate chain the server presents.
//! 2. Those certificates become the only trust anchors of the real channel.
//! 3. The real channel is dialed with normal verification against that set,
//!    and every call carries `authorization: Bearer <key>`.
//!
//! This is trust-on-first-use: whoever answers the first handshake is trusted.
//! The whole bootstrap is bounded by [`CONNECT_TIMEOUT`].

use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tokio_rustls::TlsConnector;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status};
use tracing::{debug, info};

use crate::config::ConnectionSettings;
use crate::error::ProviderError;

/// Upper bound on certificate harvest plus dial.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The shared, authenticated channel every façade call goes through.
pub type AuthChannel = InterceptedService<Channel, BearerToken>;

/// Attaches the API key to every outgoing call.
///
/// No transport check happens here; the channel it wraps is always TLS.
#[derive(Clone)]
pub struct BearerToken {
    header: MetadataValue<Ascii>,
}

impl BearerToken {
    pub fn new(api_key: &str) -> Result<Self, ProviderError> {
        let mut header = format!("Bearer {}", api_key)
            .parse::<MetadataValue<Ascii>>()
            .map_err(|_| {
                ProviderError::Configuration(
                    "key contains characters that cannot be sent in a header".to_string(),
                )
            })?;
        header.set_sensitive(true);
        Ok(Self { header })
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

impl Interceptor for BearerToken {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert("authorization", self.header.clone());
        Ok(request)
    }
}

/// Accepts whatever certificate the server presents. Handshake signatures are
/// still checked so the harvested chain belongs to the peer we talked to.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

fn connectivity(context: &str, endpoint: &str, err: impl std::fmt::Display) -> ProviderError {
    ProviderError::Connectivity(format!("{} {}: {}", context, endpoint, err))
}

/// Handshake with `host:port` and return the certificate chain the server
/// presented, leaf first.
pub async fn fetch_server_certificates(
    host: &str,
    port: u16,
    deadline: Instant,
) -> Result<Vec<CertificateDer<'static>>, ProviderError> {
    let endpoint = format!("{}:{}", host, port);

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| connectivity("cannot build TLS config for", &endpoint, e))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
        .with_no_client_auth();

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| connectivity("invalid server name for", &endpoint, e))?;

    let harvest = async {
        let tcp = TcpStream::connect(endpoint.as_str())
            .await
            .map_err(|e| connectivity("cannot reach", &endpoint, e))?;
        let mut stream = TlsConnector::from(Arc::new(config))
            .connect(server_name, tcp)
            .await
            .map_err(|e| connectivity("TLS handshake failed with", &endpoint, e))?;

        let chain = stream
            .get_ref()
            .1
            .peer_certificates()
            .map(|certs| certs.to_vec())
            .unwrap_or_default();
        let _ = stream.shutdown().await;
        Ok::<_, ProviderError>(chain)
    };

    let chain = timeout_at(deadline, harvest)
        .await
        .map_err(|_| connectivity("timed out fetching certificates from", &endpoint, "deadline exceeded"))??;

    if chain.is_empty() {
        return Err(ProviderError::Connectivity(format!(
            "{} presented no certificates",
            endpoint
        )));
    }
    Ok(chain)
}

/// A TLS config that trusts exactly `certs` and verifies the peer as `host`.
pub fn trust_store(host: &str, certs: &[CertificateDer<'_>]) -> ClientTlsConfig {
    certs
        .iter()
        .map(|der| pem::encode(&pem::Pem::new("CERTIFICATE", der.as_ref().to_vec())))
        .fold(ClientTlsConfig::new(), |tls, pem| {
            tls.ca_certificate(Certificate::from_pem(pem))
        })
        .domain_name(host)
}

/// Build the authenticated channel described by `settings`.
pub async fn connect(settings: &ConnectionSettings) -> Result<AuthChannel, ProviderError> {
    connect_within(settings, CONNECT_TIMEOUT).await
}

/// [`connect`] with a caller-chosen bound.
pub async fn connect_within(
    settings: &ConnectionSettings,
    limit: Duration,
) -> Result<AuthChannel, ProviderError> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let deadline = Instant::now() + limit;
    let endpoint = format!("{}:{}", settings.host, settings.port);
    let token = BearerToken::new(&settings.api_key)?;

    let certs = fetch_server_certificates(&settings.host, settings.port, deadline).await?;
    debug!(endpoint = %endpoint, certificates = certs.len(), "Harvested server certificates");

    let tls = trust_store(&settings.host, &certs);
    let channel = Endpoint::from_shared(format!("https://{}", endpoint))
        .map_err(|e| connectivity("invalid endpoint", &endpoint, e))?
        .connect_timeout(limit)
        .tls_config(tls)
        .map_err(|e| connectivity("cannot apply TLS config for", &endpoint, e))?;

    let channel = timeout_at(deadline, channel.connect())
        .await
        .map_err(|_| connectivity("timed out dialing", &endpoint, "deadline exceeded"))?
        .map_err(|e| connectivity("cannot dial", &endpoint, e))?;

    info!(endpoint = %endpoint, "Connected to ChirpStack");
    Ok(InterceptedService::new(channel, token))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
    use rustls::ServerConfig;
    use tokio::net::TcpListener;
    use tokio_rustls::TlsAcceptor;

    /// A self-signed certificate for `localhost` as (cert PEM, key PEM, cert DER).
    pub(crate) fn self_signed() -> (String, String, CertificateDer<'static>) {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
            .expect("certificate generation should succeed");
        (
            certified.cert.pem(),
            certified.key_pair.serialize_pem(),
            certified.cert.der().clone(),
        )
    }

    /// Accept TLS connections with the given certificate until the test ends.
    async fn tls_listener() -> (u16, CertificateDer<'static>) {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
            .expect("certificate generation should succeed");
        let cert = certified.cert.der().clone();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
            certified.key_pair.serialize_der(),
        ));

        let config = ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.clone()], key)
        .unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                let acceptor = acceptor.clone();
                tokio::spawn(async move {
                    let _ = acceptor.accept(tcp).await;
                });
            }
        });
        (port, cert)
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    fn settings(port: u16) -> ConnectionSettings {
        ConnectionSettings {
            host: "localhost".to_string(),
            port,
            api_key: "test-key".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_presented_chain() {
        let (port, cert) = tls_listener().await;
        let chain = fetch_server_certificates("localhost", port, Instant::now() + CONNECT_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(chain, vec![cert]);
    }

    #[tokio::test]
    async fn test_fetch_from_closed_port_is_connectivity_error() {
        let port = closed_port().await;
        let err = fetch_server_certificates("localhost", port, Instant::now() + CONNECT_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_fetch_from_plain_tcp_times_out() {
        // Accepts TCP but never speaks TLS.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let hold = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((tcp, _)) = listener.accept().await {
                open.push(tcp);
            }
        });

        let started = std::time::Instant::now();
        let err = fetch_server_certificates(
            "localhost",
            port,
            Instant::now() + Duration::from_millis(300),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProviderError::Connectivity(_)));
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < CONNECT_TIMEOUT);
        hold.abort();
    }

    #[tokio::test]
    async fn test_connect_unreachable_is_connectivity_error() {
        let port = closed_port().await;
        let started = std::time::Instant::now();
        let err = connect(&settings(port)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Connectivity(_)));
        assert!(started.elapsed() <= CONNECT_TIMEOUT);
    }

    #[test]
    fn test_trust_store_accepts_harvested_chain() {
        let (_, _, der) = self_signed();
        let tls = trust_store("localhost", &[der]);
        assert!(Endpoint::from_static("https://localhost:8080")
            .tls_config(tls)
            .is_ok());
    }

    #[test]
    fn test_bearer_token_sets_authorization() {
        let mut token = BearerToken::new("abc123").unwrap();
        let request = token.call(Request::new(())).unwrap();
        let value = request.metadata().get("authorization").unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc123");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_bearer_token_rejects_unprintable_key() {
        let err = BearerToken::new("line\nbreak").unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_bearer_token_debug_is_redacted() {
        let token = BearerToken::new("abc123").unwrap();
        assert!(!format!("{:?}", token).contains("abc123"));
    }
}
