pub mod http_auth_gateway;
