mod fake_test;
mod websocket_test;
