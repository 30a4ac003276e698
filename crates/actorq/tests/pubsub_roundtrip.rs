// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end tests against a real Proxy/Registrar server pair bound on
//! loopback, one dedicated port range per test to avoid collisions.

use actorq::address::{ProxyAddress, RegAddress};
use actorq::server::{ProxyServer, RegistrarServer};
use actorq::{make_message, parse_message, Actor, Topic};
use std::sync::mpsc;
use std::time::Duration;

fn start_proxy(pub_port: u16) -> ProxyServer {
    let server = ProxyServer::start(ProxyAddress::new("127.0.0.1", pub_port)).unwrap();
    // Let the forwarder and control threads finish binding before any actor
    // connects; the transport is connectionless so this only needs to cover
    // thread startup, not a handshake.
    std::thread::sleep(Duration::from_millis(50));
    server
}

#[test]
fn publish_is_delivered_to_a_matching_subscriber() {
    let proxy = start_proxy(27771);
    let address = proxy.address().clone();

    let publisher = Actor::new("pub-1");
    let subscriber = Actor::new("sub-1");

    let topic = Topic::build2("sensors", "temperature").unwrap();
    let (tx, rx) = mpsc::channel();

    let sub_conn = subscriber.connect_to(&address).unwrap();
    let handle = subscriber
        .subscribe(
            topic.clone(),
            sub_conn,
            std::sync::Arc::new(move |msg| {
                let value: f64 = parse_message(&msg).unwrap();
                tx.send(value).unwrap();
            }),
        )
        .unwrap();

    // Give the SUB socket time to propagate its subscription to the XPUB
    // side before the publisher sends anything.
    std::thread::sleep(Duration::from_millis(200));

    let pub_conn = publisher.connect_to(&address).unwrap();
    let msg = make_message(topic, 42.5f64).unwrap();
    publisher.publish(&pub_conn, &msg).unwrap();

    let received = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(received, 42.5);

    handle.unsubscribe();
    proxy.stop();
}

#[test]
fn subscriber_does_not_see_unrelated_topics() {
    let proxy = start_proxy(27781);
    let address = proxy.address().clone();

    let publisher = Actor::new("pub-2");
    let subscriber = Actor::new("sub-2");

    let wanted = Topic::build2("sensors", "temperature").unwrap();
    let other = Topic::build2("sensors", "humidity").unwrap();
    let (tx, rx) = mpsc::channel();

    let sub_conn = subscriber.connect_to(&address).unwrap();
    let handle = subscriber
        .subscribe(
            wanted,
            sub_conn,
            std::sync::Arc::new(move |msg| {
                tx.send(msg.topic().clone()).unwrap();
            }),
        )
        .unwrap();

    std::thread::sleep(Duration::from_millis(200));

    let pub_conn = publisher.connect_to(&address).unwrap();
    let msg = make_message(other, 1.0f64).unwrap();
    publisher.publish(&pub_conn, &msg).unwrap();

    let result = rx.recv_timeout(Duration::from_millis(500));
    assert!(result.is_err(), "subscriber should not receive unrelated topic");

    handle.unsubscribe();
    proxy.stop();
}

#[test]
fn sync_publish_receives_a_reply() {
    let proxy = start_proxy(27791);
    let address = proxy.address().clone();

    let responder = Actor::new("responder");
    let caller = Actor::new("caller");

    let request_topic = Topic::build2("svc", "echo").unwrap();
    let responder_conn = responder.connect_to(&address).unwrap();
    let handle = responder
        .subscribe(
            request_topic.clone(),
            responder_conn,
            std::sync::Arc::new({
                let address = address.clone();
                move |msg| {
                    if let Some(replyto) = msg.replyto() {
                        let value: f64 = parse_message(&msg).unwrap();
                        let reply_actor = Actor::new("responder-reply");
                        let reply_conn = reply_actor.connect_to(&address).unwrap();
                        let reply = make_message(replyto.clone(), value * 2.0).unwrap();
                        reply_actor.publish(&reply_conn, &reply).unwrap();
                    }
                }
            }),
        )
        .unwrap();

    std::thread::sleep(Duration::from_millis(200));

    let caller_conn = caller.connect_to(&address).unwrap();
    let request = make_message(request_topic, 21.0f64).unwrap();
    let reply = caller
        .sync_publish(&caller_conn, request, 2000)
        .unwrap();
    let value: f64 = parse_message(&reply).unwrap();
    assert_eq!(value, 42.0);

    handle.unsubscribe();
    proxy.stop();
}

#[test]
fn sync_publish_times_out_without_a_responder() {
    let proxy = start_proxy(27801);
    let address = proxy.address().clone();

    let caller = Actor::new("lonely-caller");
    let topic = Topic::build2("svc", "nobody-home").unwrap();
    let conn = caller.connect_to(&address).unwrap();
    let request = make_message(topic, 1.0f64).unwrap();

    let err = caller.sync_publish(&conn, request, 300).unwrap_err();
    assert!(matches!(err, actorq::Error::Timeout(_)));

    proxy.stop();
}

#[test]
fn registrar_round_trips_publisher_registration_and_discovery() {
    let registrar = RegistrarServer::start(RegAddress::new("127.0.0.1", 28888)).unwrap();
    std::thread::sleep(Duration::from_millis(50));

    let actor = Actor::with_addresses(
        "discoverable",
        ProxyAddress::new("127.0.0.1", 27811),
        registrar.address().clone(),
    );
    let topic = Topic::build2("data", "frames").unwrap();
    actor.register_publisher(&topic, "frame producer").unwrap();

    let found = actor.find_publishers(&Topic::raw("data")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "discoverable");
    assert_eq!(found[0].subject, "frames");

    actor.deregister_publisher(&topic).unwrap();
    let found = actor.find_publishers(&Topic::raw("data")).unwrap();
    assert!(found.is_empty());

    registrar.stop();
}

#[test]
fn subscription_worker_stops_cleanly_and_releases_its_driver() {
    let proxy = start_proxy(27821);
    let address = proxy.address().clone();

    let subscriber = Actor::new("cancellable-sub");
    let topic = Topic::build2("misc", "noise").unwrap();
    let conn = subscriber.connect_to(&address).unwrap();

    let handle = subscriber
        .subscribe(topic, conn, std::sync::Arc::new(|_msg| {}))
        .unwrap();
    assert!(handle.is_running());

    handle.unsubscribe();
    // The driver was handed back to the pool by the worker before it exited.
    assert_eq!(subscriber.pool().idle_proxy_count(&address), 1);

    proxy.stop();
}
