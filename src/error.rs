use std::path::PathBuf;

/// Errors produced while starting up or loading assets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OBJ load error in {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("STL parse error: {0}")]
    Stl(String),

    #[error("Unknown geometry format: '{0}'")]
    UnknownFormat(String),

    #[error("Model {0} contains no triangles")]
    EmptyModel(PathBuf),

    #[error("Shader error: {0}")]
    Shader(String),

    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_file() {
        let err = Error::EmptyModel(PathBuf::from("models/empty.obj"));
        assert_eq!(err.to_string(), "Model models/empty.obj contains no triangles");

        let err = Error::UnknownFormat("fbx".into());
        assert_eq!(err.to_string(), "Unknown geometry format: 'fbx'");
    }
}
