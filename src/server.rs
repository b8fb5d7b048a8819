//! Network listener bootstrap
//!
//! Connections are accepted here rather than through `axum::serve` so the
//! keep-alive timeout can close idle HTTP/1.1 connections: the HTTP/1
//! header read timer starts as soon as a connection waits for its next
//! request, and an idle connection is dropped when it expires.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::Request;
use axum::Router;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder;
use socket2::{Domain, Protocol, SockRef, Socket, TcpKeepalive, Type};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tower::Service;

use crate::config::TransportConfig;
use crate::error::Result;

/// Socket state of the connection a request arrived on.
///
/// Read back from the accepted socket, not from configuration, and
/// inserted into every request's extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub peer: SocketAddr,
    pub nodelay: bool,
    pub tcp_keepalive: bool,
    /// Idle time before keep-alive probes; only read on Linux
    pub tcp_keepalive_time: Option<Duration>,
}

impl ConnectionInfo {
    fn read(stream: &TcpStream, peer: SocketAddr) -> io::Result<Self> {
        let socket = SockRef::from(stream);
        let tcp_keepalive = socket.keepalive()?;

        Ok(Self {
            peer,
            nodelay: stream.nodelay()?,
            tcp_keepalive,
            tcp_keepalive_time: if tcp_keepalive {
                keepalive_time(&socket)?
            } else {
                None
            },
        })
    }
}

#[cfg(target_os = "linux")]
fn keepalive_time(socket: &SockRef<'_>) -> io::Result<Option<Duration>> {
    socket.keepalive_time().map(Some)
}

#[cfg(not(target_os = "linux"))]
fn keepalive_time(_socket: &SockRef<'_>) -> io::Result<Option<Duration>> {
    Ok(None)
}

/// Bind a listening socket with the configured backlog.
///
/// Must run inside a tokio runtime.
pub fn bind_listener(config: &TransportConfig) -> Result<TcpListener> {
    let addr = config.socket_addr()?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;

    let backlog = i32::try_from(config.backlog).unwrap_or(i32::MAX);
    socket.listen(backlog)?;

    Ok(TcpListener::from_std(socket.into())?)
}

/// Socket options applied to every accepted connection
fn configure_connection(stream: &TcpStream, keep_alive: Option<Duration>) -> io::Result<()> {
    stream.set_nodelay(true)?;

    if let Some(idle) = keep_alive {
        SockRef::from(stream).set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))?;
    }

    Ok(())
}

fn connection_builder(keep_alive: Option<Duration>) -> Builder<TokioExecutor> {
    let mut builder = Builder::new(TokioExecutor::new());

    match keep_alive {
        Some(idle) => {
            builder
                .http1()
                .keep_alive(true)
                .timer(TokioTimer::new())
                .header_read_timeout(idle);
        }
        None => {
            builder.http1().keep_alive(false);
        }
    }

    builder
}

/// Serve `router` until SIGINT or SIGTERM.
///
/// Blocks for the lifetime of the process; returns early only when the
/// listener cannot be set up.
pub async fn serve(config: &TransportConfig, router: Router) -> Result<()> {
    let listener = bind_listener(config)?;
    serve_with_shutdown(listener, config, router, shutdown_signal()).await
}

/// Accept connections until `shutdown` resolves, then let in-flight
/// requests finish before returning.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    config: &TransportConfig,
    router: Router,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let keep_alive = config.keep_alive();

    tracing::info!(
        addr = %listener.local_addr()?,
        backlog = config.backlog,
        keep_alive_secs = config.keep_alive_timeout,
        "Listening for HTTP traffic"
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to accept connection");
                    continue;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => continue,
            () = &mut shutdown => break,
        };

        if let Err(err) = configure_connection(&stream, keep_alive) {
            tracing::warn!(error = %err, %peer, "Failed to configure accepted connection");
        }
        let info = match ConnectionInfo::read(&stream, peer) {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(error = %err, %peer, "Dropping connection with unreadable socket");
                continue;
            }
        };
        tracing::debug!(
            %peer,
            tcp_keepalive = info.tcp_keepalive,
            "Accepted connection"
        );

        let router = router.clone();
        let mut stop = stop_rx.clone();
        connections.spawn(async move {
            let service = hyper::service::service_fn(move |mut request: Request<Incoming>| {
                request.extensions_mut().insert(info);
                router.clone().call(request)
            });

            let builder = connection_builder(keep_alive);
            let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
            tokio::pin!(conn);

            let result = tokio::select! {
                result = conn.as_mut() => result,
                () = async { let _ = stop.wait_for(|stop| *stop).await; } => {
                    conn.as_mut().graceful_shutdown();
                    conn.as_mut().await
                }
            };

            if let Err(err) = result {
                tracing::debug!(error = %err, %peer, "Connection closed with error");
            }
        });
    }

    drop(listener);
    // Receivers only see the change if the send succeeds
    let _ = stop_tx.send(true);
    while connections.join_next().await.is_some() {}

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
