mod client;

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

pub fn init_logger() {
    use simplelog::*;
    // several tests race to install it; only the first one wins
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

/// Binds a loopback listener on a free port and serves exactly one
/// connection on a background thread.
pub fn serve_once<F>(serve: F) -> SocketAddr
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("Unable to bind listener");
    let address = listener.local_addr().expect("Listener has no address");
    std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("Unable to accept connection");
        serve(stream);
    });
    address
}

/// Echoes every chunk back until the client goes away.
pub fn echo(mut stream: TcpStream) {
    let mut buffer = [0; 4096];
    loop {
        match stream.read(&mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if stream.write_all(&buffer[..n]).is_err() {
                    break;
                }
            }
        }
    }
}

/// An address nobody listens on.
pub fn refused_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Unable to bind listener");
    listener.local_addr().expect("Listener has no address")
}
