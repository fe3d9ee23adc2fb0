pub mod proto {
    tonic::include_proto!("google.cloud.speech.v2");
}

mod convert;
mod transport;

pub use transport::GrpcTransport;
