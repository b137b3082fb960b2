//! Kernel and product entities: roots, objects, spatial structure, walls,
//! projects, units and the relationships that tie them together.

use ifcx_step::{Decl, SchemaBuilder};

use crate::{label, text};

pub(crate) fn declare(b: &mut SchemaBuilder) {
    b.entity("IfcRoot")
        .abstract_entity()
        .attribute("GlobalId", Decl::named("IfcGloballyUniqueId"))
        .optional("OwnerHistory", Decl::named("IfcOwnerHistory"))
        .optional("Name", label())
        .optional("Description", text());

    b.entity("IfcObjectDefinition")
        .subtype_of("IfcRoot")
        .abstract_entity()
        .inverse("IsDecomposedBy", "IfcRelAggregates", "RelatingObject")
        .inverse("Decomposes", "IfcRelAggregates", "RelatedObjects")
        .inverse("HasAssociations", "IfcRelAssociates", "RelatedObjects");
    b.entity("IfcObject")
        .subtype_of("IfcObjectDefinition")
        .abstract_entity()
        .optional("ObjectType", label())
        .inverse("IsDefinedBy", "IfcRelDefinesByProperties", "RelatedObjects");
    b.entity("IfcContext")
        .subtype_of("IfcObjectDefinition")
        .abstract_entity()
        .optional("ObjectType", label())
        .optional("LongName", label())
        .optional("Phase", label())
        .optional("RepresentationContexts", Decl::list(Decl::named("IfcRepresentationContext")))
        .optional("UnitsInContext", Decl::named("IfcUnitAssignment"));
    b.entity("IfcProject").subtype_of("IfcContext");

    b.entity("IfcProduct")
        .subtype_of("IfcObject")
        .abstract_entity()
        .optional("ObjectPlacement", Decl::named("IfcObjectPlacement"))
        .optional("Representation", Decl::named("IfcProductRepresentation"));

    b.entity("IfcSpatialElement")
        .subtype_of("IfcProduct")
        .abstract_entity()
        .optional("LongName", label())
        .inverse("ContainsElements", "IfcRelContainedInSpatialStructure", "RelatingStructure");
    b.entity("IfcSpatialStructureElement")
        .subtype_of("IfcSpatialElement")
        .abstract_entity()
        .optional("CompositionType", Decl::named("IfcElementCompositionEnum"));
    b.entity("IfcSite")
        .subtype_of("IfcSpatialStructureElement")
        .optional("RefLatitude", Decl::named("IfcCompoundPlaneAngleMeasure"))
        .optional("RefLongitude", Decl::named("IfcCompoundPlaneAngleMeasure"))
        .optional("RefElevation", Decl::named("IfcLengthMeasure"))
        .optional("LandTitleNumber", label())
        .optional("SiteAddress", Decl::named("IfcPostalAddress"));
    b.entity("IfcBuilding")
        .subtype_of("IfcSpatialStructureElement")
        .optional("ElevationOfRefHeight", Decl::named("IfcLengthMeasure"))
        .optional("ElevationOfTerrain", Decl::named("IfcLengthMeasure"))
        .optional("BuildingAddress", Decl::named("IfcPostalAddress"));
    b.entity("IfcBuildingStorey")
        .subtype_of("IfcSpatialStructureElement")
        .optional("Elevation", Decl::named("IfcLengthMeasure"));

    b.entity("IfcElement")
        .subtype_of("IfcProduct")
        .abstract_entity()
        .optional("Tag", Decl::named("IfcIdentifier"))
        .inverse("ContainedInStructure", "IfcRelContainedInSpatialStructure", "RelatedElements");
    b.entity("IfcBuildingElement")
        .subtype_of("IfcElement")
        .abstract_entity();
    b.entity("IfcWall")
        .subtype_of("IfcBuildingElement")
        .optional("PredefinedType", Decl::named("IfcWallTypeEnum"));
    // Older exporters write the standard-case subtype.
    b.alias("IFCWALLSTANDARDCASE", "IfcWall");

    b.entity("IfcRelationship").subtype_of("IfcRoot").abstract_entity();
    b.entity("IfcRelDecomposes")
        .subtype_of("IfcRelationship")
        .abstract_entity();
    b.entity("IfcRelAggregates")
        .subtype_of("IfcRelDecomposes")
        .attribute("RelatingObject", Decl::named("IfcObjectDefinition"))
        .attribute("RelatedObjects", Decl::list(Decl::named("IfcObjectDefinition")));
    b.entity("IfcRelConnects")
        .subtype_of("IfcRelationship")
        .abstract_entity();
    b.entity("IfcRelContainedInSpatialStructure")
        .subtype_of("IfcRelConnects")
        .attribute("RelatedElements", Decl::list(Decl::named("IfcProduct")))
        .attribute("RelatingStructure", Decl::named("IfcSpatialElement"));
    b.entity("IfcRelAssociates")
        .subtype_of("IfcRelationship")
        .abstract_entity()
        .attribute("RelatedObjects", Decl::list(Decl::named("IfcDefinitionSelect")));
    b.entity("IfcRelDefines")
        .subtype_of("IfcRelationship")
        .abstract_entity();
    b.entity("IfcRelDefinesByProperties")
        .subtype_of("IfcRelDefines")
        .attribute("RelatedObjects", Decl::list(Decl::named("IfcObjectDefinition")))
        .attribute(
            "RelatingPropertyDefinition",
            Decl::named("IfcPropertySetDefinitionSelect"),
        );

    b.entity("IfcDimensionalExponents")
        .attribute("LengthExponent", Decl::Integer)
        .attribute("MassExponent", Decl::Integer)
        .attribute("TimeExponent", Decl::Integer)
        .attribute("ElectricCurrentExponent", Decl::Integer)
        .attribute("ThermodynamicTemperatureExponent", Decl::Integer)
        .attribute("AmountOfSubstanceExponent", Decl::Integer)
        .attribute("LuminousIntensityExponent", Decl::Integer);
    b.entity("IfcNamedUnit")
        .abstract_entity()
        .attribute("Dimensions", Decl::named("IfcDimensionalExponents"))
        .attribute("UnitType", Decl::named("IfcUnitEnum"));
    // Dimensions is derived for SI units and written as `*`.
    b.entity("IfcSIUnit")
        .subtype_of("IfcNamedUnit")
        .optional("Prefix", Decl::named("IfcSIPrefix"))
        .attribute("Name", Decl::named("IfcSIUnitName"));
    b.entity("IfcUnitAssignment")
        .attribute("Units", Decl::list(Decl::named("IfcUnit")));
}
