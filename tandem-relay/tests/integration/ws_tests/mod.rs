mod test_ws_signaling;
