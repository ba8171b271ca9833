use device_link::{Conn, RetryConn, Sentinel, TcpProvider, TransportOptions, TransportProvider};

use simplelog::*;

use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

fn main() {
    TermLogger::init(
        LevelFilter::Debug,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").expect("Unable to start server");
    let address = listener.local_addr().unwrap();
    start_server(listener);

    let options = TransportOptions::new(address.to_string())
        .with_timeout(Duration::from_millis(500))
        .with_retries(2, Duration::from_millis(100))
        .with_max_frame_size(260);
    let conn = TcpProvider
        .create_conn(options.clone())
        .expect("Unable to create connection");
    let mut conn = RetryConn::new(conn, &options);
    conn.open().expect("Unable to connect to server");

    let requests: [&[u8]; 2] = [b"\x01\x03\x00\x00\x00\x02", b"status"];
    for request in requests {
        match conn.send(request) {
            Ok(response) => println!("{:?} -> {:?}", request, response),
            Err(err) => println!("{:?} failed: {}", request, err),
        }
    }

    conn.close().expect("Close failed");
    match conn.send(b"late") {
        Err(err) if err.is(Sentinel::ConnClosed) => println!("closed as expected"),
        other => panic!("unexpected result {:?}", other),
    }
    println!("finished");
}

fn start_server(listener: TcpListener) {
    std::thread::spawn(move || {
        let (mut server, socket_address) = listener.accept().unwrap();
        println!("server connected to {:?}", socket_address);
        let mut buffer = [0; 260];
        loop {
            match server.read(&mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(n) => server.write_all(&buffer[..n]).unwrap(),
            }
        }
        println!("Server closed");
    });
}
