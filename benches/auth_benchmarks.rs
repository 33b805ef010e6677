use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use ticket_booking::auth::{authorize, bearer, token, Claims, Role, TokenKey};

fn bench_token_codec(c: &mut Criterion) {
    let key = TokenKey::generate("bench");
    let claims = Claims::new(42, Role::Customer);

    c.bench_function("token_encode", |b| {
        b.iter(|| token::encode(black_box(&claims), &key))
    });

    let sealed = token::encode(&claims, &key).unwrap();
    c.bench_function("token_decode", |b| {
        b.iter(|| token::decode(black_box(&sealed), &key))
    });

    let mut tampered = sealed.clone().into_bytes();
    let mid = tampered.len() / 2;
    tampered[mid] = if tampered[mid] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();
    c.bench_function("token_decode_tampered", |b| {
        b.iter(|| token::decode(black_box(&tampered), &key))
    });
}

fn bench_gate(c: &mut Criterion) {
    let key = TokenKey::generate("bench");
    let sealed = token::encode(&Claims::new(42, Role::Admin), &key).unwrap();

    let mut valid = HeaderMap::new();
    valid.insert(AUTHORIZATION, HeaderValue::from_str(&bearer(&sealed)).unwrap());
    c.bench_function("authorize_valid", |b| {
        b.iter(|| authorize(black_box(&valid), &key))
    });

    let mut malformed = HeaderMap::new();
    malformed.insert(AUTHORIZATION, HeaderValue::from_str(&sealed).unwrap());
    c.bench_function("authorize_malformed_header", |b| {
        b.iter(|| authorize(black_box(&malformed), &key))
    });
}

fn bench_key_parsing(c: &mut Criterion) {
    let hex_key = TokenKey::generate("bench").to_hex();

    c.bench_function("token_key_parse_hex", |b| {
        b.iter(|| TokenKey::parse(black_box(&hex_key), "bench"))
    });
}

criterion_group!(benches, bench_token_codec, bench_gate, bench_key_parsing);
criterion_main!(benches);
